use super::*;

fn stereo(samples: &[f32]) -> AudioPcm {
    AudioPcm {
        sample_rate: 10,
        channels: 2,
        interleaved_f32: samples.iter().flat_map(|&s| [s, s]).collect(),
    }
}

#[test]
fn normalization_reaches_the_target_level() {
    let mut pcm = stereo(&[0.01, -0.01, 0.01, -0.01]);
    normalize_loudness(&mut pcm, -20.0);
    assert!((rms(&pcm.interleaved_f32) - 0.1).abs() < 1e-5);
}

#[test]
fn normalization_respects_the_peak_ceiling() {
    let mut pcm = stereo(&[0.5, 0.0, 0.0, 0.0]);
    normalize_loudness(&mut pcm, 0.0);
    let peak = pcm.interleaved_f32.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!((peak - 0.99).abs() < 1e-6);

    let mut silent = stereo(&[0.0; 4]);
    normalize_loudness(&mut silent, -20.0);
    assert!(silent.interleaved_f32.iter().all(|&s| s == 0.0));
}

#[test]
fn trailing_silence_is_cut_to_the_maximum() {
    // 3 audible frames then 20 silent frames at 10 Hz
    let mut samples = vec![0.5, 0.5, 0.5];
    samples.extend(std::iter::repeat_n(0.0, 20));
    let mut pcm = stereo(&samples);
    trim_trailing_silence(
        &mut pcm,
        &SilenceTrimConfig {
            enabled: true,
            max_silence_sec: 1.0,
            threshold_db: -50.0,
        },
    );
    assert_eq!(pcm.frames(), 13);

    let mut short = stereo(&[0.5, 0.0]);
    trim_trailing_silence(
        &mut short,
        &SilenceTrimConfig {
            enabled: true,
            max_silence_sec: 1.0,
            threshold_db: -50.0,
        },
    );
    assert_eq!(short.frames(), 2);
}

#[test]
fn silent_clip_keeps_half_a_second() {
    let cfg = SilenceTrimConfig {
        enabled: true,
        max_silence_sec: 1.0,
        threshold_db: -50.0,
    };
    // 10 Hz: half a second is 5 frames, independent of max_silence_sec
    let mut silent = stereo(&[0.0; 30]);
    trim_trailing_silence(&mut silent, &cfg);
    assert_eq!(silent.frames(), 5);

    let mut tiny = stereo(&[0.0; 3]);
    trim_trailing_silence(&mut tiny, &cfg);
    assert_eq!(tiny.frames(), 3);
}

#[test]
fn tempo_shortens_the_clip() {
    let pcm = stereo(&[0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]);
    let fast = change_tempo(
        &pcm,
        &TempoConfig {
            enabled: true,
            rate: 2.0,
        },
    );
    assert_eq!(fast.frames(), 5);
    assert!((fast.interleaved_f32[2] - 0.2).abs() < 1e-6);
}

#[test]
fn echo_adds_a_decayed_tail() {
    let mut pcm = stereo(&[1.0, 0.0]);
    apply_echo(
        &mut pcm,
        &EchoConfig {
            enabled: true,
            delay_sec: 0.1,
            decay: 0.5,
        },
    );
    assert_eq!(pcm.frames(), 3);
    let left: Vec<f32> = pcm.interleaved_f32.iter().step_by(2).copied().collect();
    assert_eq!(left, vec![1.0, 0.5, 0.0]);
}

#[test]
fn disabled_steps_leave_the_clip_alone() {
    let cfg = AudioConfig {
        normalization: crate::config::model::NormalizationConfig {
            enabled: false,
            ..Default::default()
        },
        silence_trimming: SilenceTrimConfig {
            enabled: false,
            ..Default::default()
        },
        tempo: TempoConfig::default(),
        echo: EchoConfig::default(),
    };
    let pcm = stereo(&[0.3, 0.0, 0.0]);
    assert_eq!(process_narration(pcm.clone(), &cfg), pcm);
}
