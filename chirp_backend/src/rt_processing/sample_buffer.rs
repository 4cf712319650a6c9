use chirp_core::BufferError;

/// Non-owning view over interleaved 16-bit sample storage.
///
/// The view never copies: [`SampleBuffer::slice`] and [`SampleBuffer::tail`]
/// reborrow a frame range of the same storage. Frame count is derived from the
/// storage length, so a view is always a whole number of frames.
#[derive(Debug)]
pub struct SampleBuffer<'a> {
    samples: &'a mut [i16],
    channels: usize,
    sample_rate: u32,
}

impl<'a> SampleBuffer<'a> {
    pub fn new(samples: &'a mut [i16], channels: usize, sample_rate: u32) -> Result<Self, BufferError> {
        if channels == 0 {
            return Err(BufferError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(BufferError::InvalidSampleRate(sample_rate));
        }
        if samples.len() % channels != 0 {
            return Err(BufferError::RaggedStorage {
                len: samples.len(),
                channels,
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved samples of the whole view.
    pub fn samples(&self) -> &[i16] {
        &*self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [i16] {
        &mut *self.samples
    }

    /// View of `length` frames starting at frame `offset`.
    pub fn slice(&mut self, offset: usize, length: usize) -> Result<SampleBuffer<'_>, BufferError> {
        let frames = self.frames();
        match offset.checked_add(length) {
            Some(end) if end <= frames => Ok(SampleBuffer {
                samples: &mut self.samples[offset * self.channels..end * self.channels],
                channels: self.channels,
                sample_rate: self.sample_rate,
            }),
            _ => Err(BufferError::OutOfRange {
                offset,
                length,
                frames,
            }),
        }
    }

    /// View from frame `offset` to the end.
    pub fn slice_from(&mut self, offset: usize) -> Result<SampleBuffer<'_>, BufferError> {
        let length = self.frames().saturating_sub(offset);
        self.slice(offset, length)
    }

    /// Like [`SampleBuffer::slice_from`] but saturating; an offset past the end
    /// yields an empty view. Used on the render path where errors are not an option.
    pub fn tail(&mut self, offset: usize) -> SampleBuffer<'_> {
        let start = offset.min(self.frames()) * self.channels;
        SampleBuffer {
            samples: &mut self.samples[start..],
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Saturating view of the first `length` frames.
    pub fn head(&mut self, length: usize) -> SampleBuffer<'_> {
        let end = length.min(self.frames()) * self.channels;
        SampleBuffer {
            samples: &mut self.samples[..end],
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Samples of one channel, one per frame.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = &i16> + '_ {
        debug_assert!(channel < self.channels);
        self.samples.iter().skip(channel).step_by(self.channels)
    }

    pub fn channel_mut(&mut self, channel: usize) -> impl Iterator<Item = &mut i16> + '_ {
        debug_assert!(channel < self.channels);
        let stride = self.channels;
        self.samples.iter_mut().skip(channel).step_by(stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rejects_bad_layouts() {
        let mut storage = [0i16; 9];
        assert_eq!(
            SampleBuffer::new(&mut storage, 0, 44_100).unwrap_err(),
            BufferError::NoChannels
        );
        assert_eq!(
            SampleBuffer::new(&mut storage, 2, 44_100).unwrap_err(),
            BufferError::RaggedStorage { len: 9, channels: 2 }
        );
        assert_eq!(
            SampleBuffer::new(&mut storage, 3, 0).unwrap_err(),
            BufferError::InvalidSampleRate(0)
        );
    }

    #[test]
    fn slice_shares_storage() {
        let mut storage = [0i16; 8];
        {
            let mut buffer = SampleBuffer::new(&mut storage, 2, 44_100).unwrap();
            assert_eq!(buffer.frames(), 4);
            let mut middle = buffer.slice(1, 2).unwrap();
            assert_eq!(middle.frames(), 2);
            assert_eq!(middle.sample_rate(), 44_100);
            middle.samples_mut().fill(7);
        }
        assert_eq!(storage, [0, 0, 7, 7, 7, 7, 0, 0]);
    }

    #[test]
    fn slice_out_of_range_fails() {
        let mut storage = [0i16; 8];
        let mut buffer = SampleBuffer::new(&mut storage, 2, 44_100).unwrap();
        assert_eq!(
            buffer.slice(3, 2).unwrap_err(),
            BufferError::OutOfRange {
                offset: 3,
                length: 2,
                frames: 4
            }
        );
        assert!(buffer.slice(usize::MAX, 2).is_err());
        assert_eq!(buffer.slice(4, 0).unwrap().frames(), 0);
        assert!(buffer.slice_from(5).is_err());
        assert_eq!(buffer.slice_from(1).unwrap().frames(), 3);
    }

    #[test]
    fn tail_and_head_saturate() {
        let mut storage = [0i16; 6];
        let mut buffer = SampleBuffer::new(&mut storage, 3, 8_000).unwrap();
        assert_eq!(buffer.tail(1).frames(), 1);
        assert!(buffer.tail(10).is_empty());
        assert_eq!(buffer.head(10).frames(), 2);
        assert_eq!(buffer.head(1).samples().len(), 3);
    }

    #[test]
    fn channel_iterates_with_stride() {
        let mut storage = [1i16, 2, 3, 4, 5, 6];
        let mut buffer = SampleBuffer::new(&mut storage, 2, 8_000).unwrap();
        let right: Vec<i16> = buffer.channel(1).copied().collect();
        assert_eq!(right, vec![2, 4, 6]);
        for s in buffer.channel_mut(0) {
            *s = -*s;
        }
        assert_eq!(buffer.samples(), &[-1, 2, -3, 4, -5, 6]);
    }
}
