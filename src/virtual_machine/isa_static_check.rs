#[cfg(test)]
mod tests {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    const EXPECTED_OPCODE_TABLE_HASH: u64 = 482162021246927189;

    fn fnv1a64(mut h: u64, bytes: &[u8]) -> u64 {
        for b in bytes {
            h ^= *b as u64;
            h = h.wrapping_mul(FNV_PRIME);
        }
        h
    }

    macro_rules! hash_opcode_table {
        (
            $( $(#[$doc:meta])* $name:ident = $code:literal, $mnemonic:literal => [ $( $field:ident : $kind:ident ),* $(,)? ] ),* $(,)?
        ) => {{
            let mut h = FNV_OFFSET;
            $(
                h = fnv1a64(h, stringify!($name).as_bytes());
                h = fnv1a64(h, &[crate::virtual_machine::isa::Opcode::$name as u8]);
                h = fnv1a64(h, $mnemonic.as_bytes());
                $( h = fnv1a64(h, stringify!($kind).as_bytes()); )*
            )*
            h
        }};
    }

    fn current_opcode_table_hash() -> u64 {
        crate::for_each_opcode!(hash_opcode_table)
    }

    #[test]
    #[ignore]
    fn print_opcode_table_hash() {
        println!("OPCODE_TABLE_HASH={}", current_opcode_table_hash());
    }

    /// Programs in the wild depend on these exact codes; changing the table must be deliberate.
    #[test]
    fn opcode_table_unchanged() {
        assert_eq!(current_opcode_table_hash(), EXPECTED_OPCODE_TABLE_HASH);
    }
}
