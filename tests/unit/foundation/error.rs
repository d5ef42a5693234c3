use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        InkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        InkError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(InkError::io("x").to_string().contains("io error:"));
    assert!(
        InkError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = InkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
