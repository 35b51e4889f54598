//! Fire-and-forget sound playback.
//!
//! Decoding and output devices live behind [`AudioSink`]. The toolkit only
//! decides which voice a sound goes to: [`VoicePool`] cycles through a fixed
//! number of voices so rapid retriggers overlap instead of cutting each
//! other off.

use std::fmt;

/// Name of a sound asset, resolved by the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundId(pub &'static str);

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Output side of the audio collaborator.
pub trait AudioSink {
    /// Start `sound` on `voice`, replacing whatever that voice was playing.
    fn play(&mut self, voice: usize, sound: SoundId);
}

/// Sink that only logs, for hosts without audio output.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, voice: usize, sound: SoundId) {
        log::info!("play {} on voice {}", sound, voice);
    }
}

/// Round-robin assignment of sounds to a fixed set of voices.
pub struct VoicePool {
    sink: Box<dyn AudioSink>,
    voices: usize,
    next: usize,
}

impl VoicePool {
    pub const DEFAULT_VOICES: usize = 4;

    /// A pool of `voices` voices; at least one is always allocated.
    pub fn new(sink: Box<dyn AudioSink>, voices: usize) -> Self {
        if voices == 0 {
            log::warn!("voice pool needs at least one voice, using 1");
        }
        Self {
            sink,
            voices: voices.max(1),
            next: 0,
        }
    }

    pub fn voices(&self) -> usize {
        self.voices
    }

    /// Play `sound` on the next voice in turn and return that voice.
    pub fn trigger(&mut self, sound: SoundId) -> usize {
        let voice = self.next;
        self.next = (self.next + 1) % self.voices;
        self.sink.play(voice, sound);
        voice
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new(Box::new(LogSink), Self::DEFAULT_VOICES)
    }
}

impl fmt::Debug for VoicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoicePool")
            .field("voices", &self.voices)
            .field("next", &self.next)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct Recorder(Rc<RefCell<Vec<(usize, SoundId)>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, voice: usize, sound: SoundId) {
            self.0.borrow_mut().push((voice, sound));
        }
    }

    #[test]
    fn test_round_robin() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut pool = VoicePool::new(Box::new(Recorder(played.clone())), 3);
        let chord = SoundId("chord");

        let voices: Vec<usize> = (0..5).map(|_| pool.trigger(chord)).collect();
        assert_eq!(voices, vec![0, 1, 2, 0, 1]);
        assert_eq!(played.borrow().len(), 5);
        assert_eq!(played.borrow()[3], (0, chord));
    }

    #[test]
    fn test_zero_voices_clamps_to_one() {
        let mut pool = VoicePool::new(Box::new(LogSink), 0);
        assert_eq!(pool.voices(), 1);
        assert_eq!(pool.trigger(SoundId("ding")), 0);
        assert_eq!(pool.trigger(SoundId("ding")), 0);
    }
}
