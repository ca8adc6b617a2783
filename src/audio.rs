//! Audio system
//!
//! Background music comes from the page's `<audio id="backgroundMusic">`
//! element. Sound effects are generated with the Web Audio API, so no extra
//! files are needed. Anything unavailable just stays silent.

use wasm_bindgen::JsCast;
use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use crate::sim::SoundEffect;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music: Option<HtmlAudioElement>,
    sfx_volume: f32,
    muted: bool,
}

impl AudioManager {
    pub fn new(music_volume: f32) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - sound effects disabled");
        }

        let music = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("backgroundMusic"))
            .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok());
        match &music {
            Some(music) => {
                music.set_loop(true);
                music.set_volume(f64::from(music_volume.clamp(0.0, 1.0)));
            }
            None => log::warn!("No #backgroundMusic element - music disabled"),
        }

        Self {
            ctx,
            music,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(music) = &self.music {
            music.set_muted(muted);
        }
    }

    /// Start (or resume) the background track
    pub fn start_music(&self) {
        if let Some(music) = &self.music {
            // Rejected when autoplay is blocked; the next user gesture retries
            let _ = music.play();
        }
    }

    pub fn pause_music(&self) {
        if let Some(music) = &self.music {
            let _ = music.pause();
        }
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Damage => self.play_damage(ctx, vol),
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Damage - heavy crunch dropping into a low thud
    fn play_damage(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.45)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.4)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }

        // Gritty top layer
        if let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency().set_value_at_time(300.0, t + 0.03).ok();
            osc.frequency().set_value_at_time(700.0, t + 0.06).ok();
            osc.frequency().set_value_at_time(150.0, t + 0.09).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        // Sub thump
        if let Some((osc, gain)) = self.create_osc(ctx, 60.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }
    }
}
