use rfidtap::prelude::{decode_chunk, FrameBuilder, Limits, MessageKind, RfidtapConfig};
use rfidtap::RfidtapError;

#[test]
fn prelude_exposes_frame_and_config_types() {
    let bytes = FrameBuilder::new(0x17)
        .payload(&[0xAB, 0xCD])
        .build()
        .expect("two byte payload fits")
        .encode();
    let report = decode_chunk(&bytes).expect("built frame decodes");
    assert_eq!(report.kind, MessageKind::TagRead);
    assert!(report.is_valid());

    assert!(Limits::default().validate().is_ok());
    assert!(RfidtapConfig::default().validate().is_ok());
}

#[test]
fn unified_error_wraps_frame_errors() {
    let frame_error = decode_chunk(&[]).expect_err("empty chunk");
    let facade_error: RfidtapError = frame_error.into();

    assert!(matches!(facade_error, RfidtapError::Frame(_)));
}

#[test]
fn unified_error_wraps_config_errors() {
    let config_error = RfidtapConfig::from_yaml_str("listener:\n  backlog: 0\n")
        .expect_err("zero backlog should fail validation");
    let facade_error: RfidtapError = config_error.into();

    assert!(matches!(facade_error, RfidtapError::Config(_)));
}
