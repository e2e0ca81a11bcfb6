//! Config files read back exactly what was written

use autoclick_recorder::{ConfigStore, Point, RecordedSequence};
use proptest::prelude::*;
use tempfile::tempdir;

fn sequence() -> impl Strategy<Value = RecordedSequence> {
    prop::collection::vec((-4000i32..8000, -4000i32..8000), 1..40).prop_flat_map(|coords| {
        let n = coords.len();
        prop::collection::vec(0i64..120_000, 0..=n).prop_map(move |intervals| RecordedSequence {
            positions: coords.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            intervals,
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn save_then_load_is_identity(seq in sequence()) {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path());
        let path = store.path("prop.txt");

        store.save(&path, &seq).unwrap();
        let loaded = store.load(&path).unwrap();
        prop_assert_eq!(loaded, seq);
    }

    #[test]
    fn every_line_carries_one_marker(seq in sequence()) {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path());
        let path = store.path("prop.txt");

        store.save(&path, &seq).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        prop_assert_eq!(lines.len(), seq.positions.len() + seq.intervals.len());
        for line in lines {
            prop_assert!(line.starts_with("坐标:") || line.starts_with("延迟:"), "{}", line);
        }
    }
}
