use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn command_carries_encode_settings() {
    let opts = FfmpegSinkOpts::new(
        "out/clip.mp4.part",
        &EncodeSettings {
            crf: 18,
            preset: "veryfast".to_owned(),
        },
    );
    let sink = FfmpegSink::new(opts);
    let cfg = SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
    };
    let cmd = sink.command(&cfg).unwrap();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let joined = args.join(" ");
    assert!(joined.contains("-preset veryfast"));
    assert!(joined.contains("-crf 18"));
    assert!(joined.contains("-an"));
    assert!(joined.contains("-f mp4 out/clip.mp4.part"));
}

#[test]
fn odd_dimensions_are_rejected() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("x.mp4", &EncodeSettings::default()));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 2,
            fps: Fps::new(30, 1).unwrap(),
            audio: None,
        })
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Validation(_)));
}
