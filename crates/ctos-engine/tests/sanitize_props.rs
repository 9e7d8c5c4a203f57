//! Property tests for the sanitizer's contract: total, parseable output,
//! idempotent.

use ctos_engine::sanitize;
use proptest::prelude::*;

proptest! {
    #[test]
    fn sanitize_never_panics_and_output_parses(input in ".*") {
        let out = sanitize(&input);
        prop_assert!(
            roxmltree::Document::parse(&out).is_ok(),
            "unparseable output {:?} for input {:?}", out, input
        );
    }

    #[test]
    fn sanitize_is_idempotent(input in ".*") {
        let once = sanitize(&input);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn sanitize_handles_markup_shaped_inputs(input in "[<>a-z/\" =&]{0,64}") {
        let out = sanitize(&input);
        prop_assert!(roxmltree::Document::parse(&out).is_ok());
        prop_assert_eq!(sanitize(&out), out.clone());
    }
}
