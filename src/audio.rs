//! Audio system using Web Audio API
//!
//! Procedurally generated signals - no decode pipeline needed. The catch
//! effect is a short "plink"; the music track is a seamlessly looping
//! filtered-noise rain bed.

use web_sys::{
    AudioBufferSourceNode, AudioContext, BiquadFilterType, GainNode, OscillatorNode,
    OscillatorType,
};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Droplet landed in the bucket
    DropletCaught,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music_source: Option<AudioBufferSourceNode>,
    music_gain: Option<GainNode>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            music_source: None,
            music_gain: None,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_volumes(&mut self, master: f32, sfx: f32, music: f32) {
        self.master_volume = master.clamp(0.0, 1.0);
        self.sfx_volume = sfx.clamp(0.0, 1.0);
        self.music_volume = music.clamp(0.0, 1.0);
        self.apply_music_gain();
    }

    /// Mute/unmute all audio; takes effect immediately on the music loop
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_music_gain();
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    fn apply_music_gain(&self) {
        if let Some(gain) = &self.music_gain {
            gain.gain().set_value(self.effective_music_volume() * 0.5);
        }
    }

    /// Play a sound effect (fire-and-forget, playbacks may overlap)
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_sfx_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::DropletCaught => self.play_droplet(ctx, vol),
        }
    }

    /// Start the looping rain ambience; idempotent
    pub fn start_music(&mut self) {
        if self.music_source.is_some() {
            return;
        }
        let Some(ctx) = self.ctx.clone() else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match self.build_rain_loop(&ctx) {
            Some((source, gain)) => {
                self.music_source = Some(source);
                self.music_gain = Some(gain);
                self.apply_music_gain();
                log::info!("rain ambience started");
            }
            None => log::warn!("failed to start rain ambience"),
        }
    }

    /// Stop the music loop; safe to call repeatedly
    pub fn stop_music(&mut self) {
        if let Some(source) = self.music_source.take() {
            let _ = source.stop();
        }
        self.music_gain = None;
    }

    // === Sound generators ===

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

    /// Water drop "plink" - a pitch-bent sine with a faint high tick
    fn play_droplet(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(320.0, t + 0.12)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.18).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 1800.0, OscillatorType::Triangle) {
            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.05)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.07).ok();
        }
    }

    /// Two seconds of noise, lowpassed into a rain hiss, looped seamlessly
    fn build_rain_loop(&self, ctx: &AudioContext) -> Option<(AudioBufferSourceNode, GainNode)> {
        let sample_rate = ctx.sample_rate();
        let len = (sample_rate * 2.0) as u32;
        let buffer = ctx.create_buffer(1, len, sample_rate).ok()?;

        // Deterministic LCG noise; any seed sounds the same once filtered
        let mut samples = vec![0.0f32; len as usize];
        let mut lcg: u32 = 0x2545_F491;
        for sample in samples.iter_mut() {
            lcg = lcg.wrapping_mul(1664525).wrapping_add(1013904223);
            *sample = (lcg >> 8) as f32 / 8_388_608.0 - 1.0;
        }
        buffer.copy_to_channel(&mut samples, 0).ok()?;

        let source = ctx.create_buffer_source().ok()?;
        source.set_buffer(Some(&buffer));
        source.set_loop(true);

        let filter = ctx.create_biquad_filter().ok()?;
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value(900.0);

        let gain = ctx.create_gain().ok()?;
        gain.gain().set_value(0.0);

        source.connect_with_audio_node(&filter).ok()?;
        filter.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        source.start().ok()?;

        Some((source, gain))
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        self.stop_music();
        if let Some(ctx) = self.ctx.take() {
            let _ = ctx.close();
        }
    }
}
