/// Joins tokens into display text.
///
/// The first token and every token following one that ends with `.` get
/// an uppercase first character. All other tokens are lowercased.
pub fn capitalize<S: AsRef<str>>(tokens: &[S]) -> String {
	let mut text = String::new();
	let mut sentence_start = true;

	for token in tokens {
		let token = token.as_ref();
		if !text.is_empty() {
			text.push(' ');
		}
		if sentence_start {
			text.push_str(&upper_first(token));
		} else {
			text.push_str(&token.to_lowercase());
		}
		sentence_start = token.ends_with('.');
	}

	text
}

/// Uppercases the first character and lowercases the rest (UTF-8 aware).
fn upper_first(token: &str) -> String {
	let mut chars = token.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}
