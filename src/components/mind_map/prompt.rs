//! Dialog capability used by the per-node controls.
//!
//! The controller never talks to the browser directly; it asks an
//! [`EditPrompt`] for text or a yes/no answer. The browser implementation
//! blocks on `window.prompt` / `window.confirm`.

/// Source of user answers for add/edit/remove.
pub trait EditPrompt {
	/// Ask for a line of text pre-filled with `default`. `None` means cancelled.
	fn request_text(&mut self, message: &str, default: &str) -> Option<String>;

	/// Ask a yes/no question. Dismissing the dialog counts as no.
	fn request_confirm(&mut self, message: &str) -> bool;
}

/// Native browser dialogs.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserPrompt;

impl EditPrompt for BrowserPrompt {
	fn request_text(&mut self, message: &str, default: &str) -> Option<String> {
		web_sys::window()?
			.prompt_with_message_and_default(message, default)
			.ok()
			.flatten()
	}

	fn request_confirm(&mut self, message: &str) -> bool {
		web_sys::window()
			.and_then(|w| w.confirm_with_message(message).ok())
			.unwrap_or(false)
	}
}

/// Replays canned answers; records what was asked.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
	pub texts: std::collections::VecDeque<Option<String>>,
	pub confirms: std::collections::VecDeque<bool>,
	pub asked: Vec<(String, String)>,
}

#[cfg(test)]
impl ScriptedPrompt {
	pub fn text(answer: Option<&str>) -> Self {
		Self {
			texts: [answer.map(str::to_string)].into(),
			..Self::default()
		}
	}

	pub fn confirm(answer: bool) -> Self {
		Self {
			confirms: [answer].into(),
			..Self::default()
		}
	}
}

#[cfg(test)]
impl EditPrompt for ScriptedPrompt {
	fn request_text(&mut self, message: &str, default: &str) -> Option<String> {
		self.asked.push((message.to_string(), default.to_string()));
		self.texts.pop_front().flatten()
	}

	fn request_confirm(&mut self, message: &str) -> bool {
		self.asked.push((message.to_string(), String::new()));
		self.confirms.pop_front().unwrap_or(false)
	}
}
