//! Packet-switched network of addressable VMs.
//!
//! Every node runs the same program and is booted with its own address as
//! first input. Nodes emit packets as three consecutive outputs
//! `(destination, x, y)`; the router appends `(x, y)` to the destination's
//! input queue. A node with nothing queued receives [`IDLE_INPUT`] so that it
//! polls instead of suspending forever. Packets for addresses outside the
//! network are handed back to the caller, which decides what to do with them
//! (typically re-injecting one once the network goes idle).

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::VM;
use crate::info;

/// Input fed to a node whose queue is empty.
pub const IDLE_INPUT: i64 = -1;

/// One routed message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Packet {
    pub dest: i64,
    pub x: i64,
    pub y: i64,
}

impl Packet {
    pub fn new(dest: i64, x: i64, y: i64) -> Self {
        Self { dest, x, y }
    }
}

/// Summary of one scheduling round.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Round {
    /// Packets addressed outside the network, in emission order.
    pub external: Vec<Packet>,
    /// Packets delivered between nodes.
    pub delivered: usize,
    /// No node had queued input at the start of its turn and nothing was sent.
    pub idle: bool,
}

/// A fixed-size set of VMs exchanging packets.
pub struct Network {
    nodes: Vec<VM>,
    idle_input: i64,
}

impl Network {
    /// Boots `size` nodes, node `i` receiving `i` as its address.
    pub fn new(program: &Program, size: usize) -> Result<Self, VMError> {
        let nodes = (0..size)
            .map(|address| -> Result<VM, VMError> {
                let mut vm = VM::new();
                vm.run(program, [address as i64])?;
                Ok(vm)
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!("booted network of {} nodes", size);
        Ok(Self {
            nodes,
            idle_input: IDLE_INPUT,
        })
    }

    /// Replaces the value fed to nodes with an empty input queue.
    pub fn with_idle_input(mut self, value: i64) -> Self {
        self.idle_input = value;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, address: usize) -> Option<&VM> {
        self.nodes.get(address)
    }

    fn index_of(&self, dest: i64) -> Option<usize> {
        usize::try_from(dest).ok().filter(|&i| i < self.nodes.len())
    }

    /// Queues a packet on its destination node.
    ///
    /// Returns `false` without side effects if the destination is not a node.
    pub fn send(&mut self, packet: Packet) -> bool {
        let Some(index) = self.index_of(packet.dest) else {
            return false;
        };
        let node = &mut self.nodes[index];
        node.add_input(packet.x);
        node.add_input(packet.y);
        true
    }

    /// Gives every live node one turn, in address order, and routes its packets.
    ///
    /// Packets sent to a node earlier in the order are picked up next round.
    /// Incomplete packets (fewer than three queued outputs) wait on the sender.
    pub fn step(&mut self) -> Result<Round, VMError> {
        let mut round = Round {
            idle: true,
            ..Round::default()
        };

        for i in 0..self.nodes.len() {
            let node = &mut self.nodes[i];
            if node.state().is_halted() {
                continue;
            }
            if node.input_count() == 0 {
                node.add_input(self.idle_input);
            } else {
                round.idle = false;
            }
            node.resume([])?;

            while self.nodes[i].output_count() >= 3 {
                let node = &mut self.nodes[i];
                let packet = Packet::new(node.pop_output()?, node.pop_output()?, node.pop_output()?);
                round.idle = false;
                if self.send(packet) {
                    round.delivered += 1;
                } else {
                    round.external.push(packet);
                }
            }
        }

        Ok(round)
    }
}
