//! Minimal TwiML document builder.
//!
//! Covers only the verbs the voicemail protocol needs: `Say`, `Pause`,
//! `Reject`, and `Play digits`. Text content is XML-escaped.

/// Voice rendering options for `Say`.
#[derive(Debug, Clone)]
pub struct SayOptions {
    pub voice: String,
    pub language: String,
    /// Speech rate multiplier, e.g. "0.8".
    pub rate: String,
    /// Optional pitch shift, e.g. "-2%".
    pub pitch: Option<String>,
}

impl Default for SayOptions {
    fn default() -> Self {
        Self {
            voice: "Polly.Joanna".to_owned(),
            language: "en-US".to_owned(),
            rate: "0.8".to_owned(),
            pitch: None,
        }
    }
}

/// Builder for a `<Response>` document.
#[derive(Debug, Default)]
pub struct Twiml {
    verbs: Vec<String>,
}

impl Twiml {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<Reject reason="busy"/>`: rejects the call with a busy signal,
    /// which pushes the leg to carrier voicemail detection.
    #[must_use]
    pub fn reject_busy(mut self) -> Self {
        self.verbs.push("<Reject reason=\"busy\"/>".to_owned());
        self
    }

    #[must_use]
    pub fn pause(mut self, seconds: u32) -> Self {
        self.verbs.push(format!("<Pause length=\"{seconds}\"/>"));
        self
    }

    #[must_use]
    pub fn say(mut self, options: &SayOptions, text: &str) -> Self {
        let pitch_attr = options
            .pitch
            .as_deref()
            .map(|p| format!(" pitch=\"{}\"", escape_xml(p)))
            .unwrap_or_default();
        self.verbs.push(format!(
            "<Say voice=\"{}\" language=\"{}\" rate=\"{}\"{}>{}</Say>",
            escape_xml(&options.voice),
            escape_xml(&options.language),
            escape_xml(&options.rate),
            pitch_attr,
            escape_xml(text),
        ));
        self
    }

    /// `<Play digits="..."/>`: DTMF tones, used to skip voicemail greetings.
    #[must_use]
    pub fn play_digits(mut self, digits: &str) -> Self {
        self.verbs.push(format!("<Play digits=\"{}\"/>", escape_xml(digits)));
        self
    }

    pub fn build(self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>{}</Response>",
            self.verbs.join("")
        )
    }
}

/// Space out a phone number digit by digit so TTS reads it slowly enough
/// for a voicemail recording to capture it.
pub fn spell_out(number: &str) -> String {
    number.chars().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
