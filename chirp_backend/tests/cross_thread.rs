//! Scheduling from game-logic threads while the render thread pulls samples.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use chirp_backend::{
    CallbackSlot, MASTER_VOLUME, ParameterMask, PolyphonicSynth, RenderMonitor, SampleBuffer, VoiceSettings,
    WaveformKind,
};

const RATE: u32 = 44_100;

fn held_tone(volume: f32) -> VoiceSettings {
    VoiceSettings::tone(WaveformKind::Square, 330.0, volume).with_duty(1.0)
}

fn render(synth: &mut PolyphonicSynth, frames: usize) -> Vec<i16> {
    let mut storage = vec![0i16; frames * 2];
    let mut buffer = SampleBuffer::new(&mut storage, 2, RATE).unwrap();
    assert_eq!(synth.generate_samples(&mut buffer), frames);
    storage
}

#[test]
fn change_from_producer_thread_is_applied() {
    let mut synth = PolyphonicSynth::new(2, 8, 7);
    let handle = synth.handle();

    // Nothing scheduled yet.
    assert!(render(&mut synth, 128).iter().all(|&s| s == 0));

    let producer = thread::spawn(move || handle.queue_parameter_change(1, 0.0, &held_tone(1.0), ParameterMask::ALL));
    assert!(producer.join().unwrap());

    let expected = (32_767.0 * MASTER_VOLUME) as i16;
    assert!(render(&mut synth, 128).iter().all(|&s| s == expected));
}

#[test]
fn many_producers_share_a_voice() {
    let mut synth = PolyphonicSynth::new(1, 64, 0);
    let handle = synth.handle();

    let producers = (0..4)
        .map(|p| {
            let handle = handle.clone();
            thread::spawn(move || {
                for i in 0..8 {
                    let volume = (p * 8 + i) as f32 / 32.0;
                    assert!(handle.queue_parameter_change(0, 0.0, &held_tone(volume), ParameterMask::ALL));
                }
            })
        })
        .collect::<Vec<_>>();

    // Keep rendering while producers run; every call must fill its buffer.
    for _ in 0..16 {
        let out = render(&mut synth, 64);
        assert_eq!(out.len(), 128);
    }
    for producer in producers {
        producer.join().unwrap();
    }

    render(&mut synth, 256);
    assert_eq!(handle.dropped_changes(), 0);
    assert_eq!(synth.voice(0).unwrap().pending_changes(), 0);
    assert!(handle.voice(0).unwrap().clock() > 0.0);
}

#[test]
fn render_thread_owns_the_slot() {
    let synth = PolyphonicSynth::new(2, 8, 0);
    let handle = synth.handle();
    let monitor = Arc::new(RenderMonitor::new(64, RATE, 0.2));
    let slot = CallbackSlot::new(Box::new(synth), RATE, 2, 64).with_monitor(Arc::clone(&monitor));

    let (tx, rx) = mpsc::channel::<()>();
    let render_thread = thread::spawn(move || {
        let mut out = vec![0i16; 128];
        // Silence until told a change is queued, then one more buffer.
        while rx.try_recv().is_err() {
            slot.process_realtime(&mut out);
            thread::yield_now();
        }
        slot.process_realtime(&mut out);
        out
    });

    assert!(handle.queue_parameter_change(0, 0.0, &held_tone(0.5), ParameterMask::ALL));
    tx.send(()).unwrap();
    let out = render_thread.join().unwrap();

    let expected = (32_767.0 * 0.5 * MASTER_VOLUME) as i16;
    assert!(out.iter().all(|&s| s == expected));
    let snap = monitor.snapshot(false);
    assert!(snap.render_calls >= 1);
    assert_eq!(snap.fallback_silences, 0);
    assert_eq!(snap.frames_rendered, snap.render_calls * 64);
}
