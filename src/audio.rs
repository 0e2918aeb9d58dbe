//! Fire-and-forget sound effects
//!
//! On the web the black hole rumble is synthesized with the Web Audio API, no
//! audio files needed. Native builds only log what would have played.
//! Playback failures never reach the animation: callers log and move on.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// The horizon starts growing
    BlackHole,
}

/// Anything that can play a sound effect
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect) -> anyhow::Result<()>;
}

/// Sink that just logs, for native and headless runs
#[derive(Debug, Default)]
pub struct LogAudio {
    volume: f32,
}

impl LogAudio {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) -> anyhow::Result<()> {
        log::info!("Playing {:?} at volume {:.2}", effect, self.volume);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use anyhow::anyhow;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};

    /// Web Audio synthesizer
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebAudio {
        pub fn new(volume: f32) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: volume.clamp(0.0, 1.0),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> anyhow::Result<(OscillatorNode, GainNode)> {
            let osc = ctx
                .create_oscillator()
                .map_err(|e| anyhow!("create_oscillator: {e:?}"))?;
            let gain = ctx.create_gain().map_err(|e| anyhow!("create_gain: {e:?}"))?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain)
                .map_err(|e| anyhow!("connect oscillator: {e:?}"))?;
            gain.connect_with_audio_node(&ctx.destination())
                .map_err(|e| anyhow!("connect gain: {e:?}"))?;

            Ok((osc, gain))
        }

        /// Black hole - a low sweep down into a sub-bass rumble
        fn play_black_hole(ctx: &AudioContext, vol: f32) -> anyhow::Result<()> {
            let t = ctx.current_time();

            let (sweep, sweep_gain) = Self::create_osc(ctx, 300.0, OscillatorType::Sine)?;
            sweep_gain.gain().set_value_at_time(vol * 0.4, t).ok();
            sweep_gain
                .gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.8)
                .ok();
            sweep.frequency().set_value_at_time(300.0, t).ok();
            sweep
                .frequency()
                .exponential_ramp_to_value_at_time(20.0, t + 0.8)
                .ok();
            sweep.start().map_err(|e| anyhow!("start sweep: {e:?}"))?;
            sweep.stop_with_when(t + 1.0).ok();

            let (rumble, rumble_gain) = Self::create_osc(ctx, 45.0, OscillatorType::Sawtooth)?;
            rumble_gain.gain().set_value_at_time(0.01, t).ok();
            rumble_gain
                .gain()
                .linear_ramp_to_value_at_time(vol * 0.25, t + 1.5)
                .ok();
            rumble_gain
                .gain()
                .exponential_ramp_to_value_at_time(0.01, t + 4.5)
                .ok();
            rumble
                .frequency()
                .exponential_ramp_to_value_at_time(25.0, t + 4.5)
                .ok();
            rumble.start().map_err(|e| anyhow!("start rumble: {e:?}"))?;
            rumble.stop_with_when(t + 4.6).ok();

            Ok(())
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect) -> anyhow::Result<()> {
            if self.volume <= 0.0 {
                return Ok(());
            }
            let ctx = self
                .ctx
                .as_ref()
                .ok_or_else(|| anyhow!("audio context unavailable"))?;

            // Browsers suspend the context until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::BlackHole => Self::play_black_hole(ctx, self.volume),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_audio_never_fails() {
        let mut audio = LogAudio::new(2.0);
        assert!(audio.play(SoundEffect::BlackHole).is_ok());
    }
}
