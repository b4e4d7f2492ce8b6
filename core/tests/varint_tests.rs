use proptest::prelude::*;
use search_core::decoder::ByteReader;
use search_core::encoder::ByteWriter;

fn min_groups(n: u64) -> usize {
    let bits = 64 - n.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

proptest! {
    #[test]
    fn varint_round_trips(n in 0u64..(1u64 << 32)) {
        let mut writer = ByteWriter::new();
        writer.write_varint(n).unwrap();
        prop_assert_eq!(writer.len(), min_groups(n));

        let bytes = writer.into_bytes();
        let mut reader = ByteReader::new(&bytes);
        prop_assert_eq!(reader.read_varint().unwrap(), n);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn only_the_last_byte_lacks_the_continuation_bit(n in any::<u64>()) {
        let mut writer = ByteWriter::new();
        writer.write_varint(n).unwrap();
        let bytes = writer.into_bytes();
        let (last, rest) = bytes.split_last().unwrap();
        prop_assert!(last & 0x80 == 0);
        prop_assert!(rest.iter().all(|b| b & 0x80 != 0));
    }

    #[test]
    fn negative_values_are_rejected(n in i64::MIN..0) {
        let mut writer = ByteWriter::new();
        prop_assert!(writer.write_varint(n).is_err());
        prop_assert!(writer.is_empty());
    }
}

#[test]
fn group_boundaries() {
    for (n, len) in [(0u64, 1), (127, 1), (128, 2), (16_383, 2), (16_384, 3), ((1 << 32) - 1, 5)] {
        let mut writer = ByteWriter::new();
        writer.write_varint(n).unwrap();
        assert_eq!(writer.len(), len, "length of {n}");
    }
}
