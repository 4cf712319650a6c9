use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use quanta::{Clock, Instant as QuantaInstant};

/// Point-in-time view of render statistics (non-RT).
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub frames_rendered: u64,
    pub render_calls: u64,
    /// Callbacks answered with silence because the source was busy or the buffer malformed.
    pub fallback_silences: u64,
    pub min_render_nanos: Option<u64>,
    pub max_render_nanos: Option<u64>,
    /// Exponential moving average of render time, in nanoseconds.
    pub ema_render_nanos: f64,
    /// Render time budget of one buffer at the configured size and rate.
    pub budget_nanos: f64,
    pub avg_load_percent: f64,
    pub timestamp: Instant,
}

/// Real-time-safe render statistics.
///
/// The render thread only touches atomics (`record_*` and the guard from
/// [`RenderMonitor::scoped_render`]). [`RenderMonitor::snapshot`] is for other threads.
pub struct RenderMonitor {
    clock: Clock,
    buffer_frames: usize,
    sample_rate: u32,

    frames_rendered: AtomicU64,
    render_calls: AtomicU64,
    fallback_silences: AtomicU64,

    min_render_nanos: AtomicU64,
    max_render_nanos: AtomicU64,
    // f64 bits
    ema_render_bits: AtomicU64,
    ema_alpha: f64,
}

impl RenderMonitor {
    /// `ema_alpha` in (0, 1]; smaller values smooth more.
    pub fn new(buffer_frames: usize, sample_rate: u32, ema_alpha: f64) -> Self {
        Self {
            clock: Clock::new(),
            buffer_frames,
            sample_rate,
            frames_rendered: AtomicU64::new(0),
            render_calls: AtomicU64::new(0),
            fallback_silences: AtomicU64::new(0),
            min_render_nanos: AtomicU64::new(u64::MAX),
            max_render_nanos: AtomicU64::new(0),
            ema_render_bits: AtomicU64::new(0),
            ema_alpha: ema_alpha.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    #[inline(always)]
    pub fn record_frames(&self, frames: u64) {
        self.frames_rendered.fetch_add(frames, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_fallback(&self) {
        self.fallback_silences.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_render_nanos(&self, nanos: u64) {
        self.min_render_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_render_nanos.fetch_max(nanos, Ordering::Relaxed);

        // Single writer (the render thread), so a plain load/store is enough.
        let old = f64::from_bits(self.ema_render_bits.load(Ordering::Relaxed));
        let new = if old == 0.0 {
            nanos as f64
        } else {
            self.ema_alpha * nanos as f64 + (1.0 - self.ema_alpha) * old
        };
        self.ema_render_bits.store(new.to_bits(), Ordering::Relaxed);
    }

    /// Counts a render call and records its duration when the guard drops.
    #[inline(always)]
    pub fn scoped_render(&self) -> RenderGuard<'_> {
        self.render_calls.fetch_add(1, Ordering::Relaxed);
        RenderGuard {
            monitor: self,
            start: self.clock.now(),
        }
    }

    pub fn snapshot(&self, reset_peaks: bool) -> RenderSnapshot {
        let min_raw = self.min_render_nanos.load(Ordering::Relaxed);
        let max_raw = self.max_render_nanos.load(Ordering::Relaxed);
        let ema = f64::from_bits(self.ema_render_bits.load(Ordering::Relaxed));
        let budget_nanos = self.buffer_frames as f64 / self.sample_rate.max(1) as f64 * 1_000_000_000.0;
        let avg_load_percent = if budget_nanos > 0.0 {
            ema / budget_nanos * 100.0
        } else {
            0.0
        };

        if reset_peaks {
            self.min_render_nanos.store(u64::MAX, Ordering::Relaxed);
            self.max_render_nanos.store(0, Ordering::Relaxed);
        }

        RenderSnapshot {
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            render_calls: self.render_calls.load(Ordering::Relaxed),
            fallback_silences: self.fallback_silences.load(Ordering::Relaxed),
            min_render_nanos: (min_raw != u64::MAX).then_some(min_raw),
            max_render_nanos: (max_raw != 0).then_some(max_raw),
            ema_render_nanos: ema,
            budget_nanos,
            avg_load_percent,
            timestamp: Instant::now(),
        }
    }
}

/// Records elapsed render time on drop. Atomics only.
pub struct RenderGuard<'a> {
    monitor: &'a RenderMonitor,
    start: QuantaInstant,
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        let elapsed = self.monitor.clock.now().saturating_duration_since(self.start);
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.monitor.record_render_nanos(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_monitor_has_no_peaks() {
        let monitor = RenderMonitor::new(512, 48_000, 0.1);
        let snap = monitor.snapshot(false);
        assert_eq!(snap.render_calls, 0);
        assert_eq!(snap.min_render_nanos, None);
        assert_eq!(snap.max_render_nanos, None);
        assert!((snap.budget_nanos - 512.0 / 48_000.0 * 1e9).abs() < 1.0);
    }

    #[test]
    fn tracks_min_max_and_load() {
        let monitor = RenderMonitor::new(480, 48_000, 0.5);
        let _ = monitor.scoped_render();
        monitor.record_render_nanos(1_000_000);
        monitor.record_render_nanos(3_000_000);
        monitor.record_frames(960);

        let snap = monitor.snapshot(true);
        assert_eq!(snap.frames_rendered, 960);
        assert_eq!(snap.render_calls, 1);
        assert_eq!(snap.max_render_nanos, Some(3_000_000));
        assert!(snap.min_render_nanos.is_some());
        // 10 ms budget; EMA sits between the two samples.
        assert!(snap.avg_load_percent > 0.0 && snap.avg_load_percent <= 30.0);

        let after = monitor.snapshot(false);
        assert_eq!(after.max_render_nanos, None);
    }

    #[test]
    fn counts_fallbacks() {
        let monitor = RenderMonitor::new(64, 44_100, 0.1);
        monitor.record_fallback();
        monitor.record_fallback();
        assert_eq!(monitor.snapshot(false).fallback_silences, 2);
    }
}
