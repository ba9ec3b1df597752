use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReliefError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReliefError::geometry("x")
            .to_string()
            .contains("geometry error:")
    );
    assert!(ReliefError::media("x").to_string().contains("media error:"));
}

#[test]
fn frame_failed_names_the_sequence_number() {
    let err = ReliefError::frame_failed(FrameSeq(7), ReliefError::geometry("empty region"));
    let msg = err.to_string();
    assert!(msg.contains("frame 7 failed"));
    assert!(msg.contains("empty region"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReliefError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
