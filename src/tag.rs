/// Candidate field/key names from a raw tag.
///
/// Tag grammar is `segment (";" segment)*`. Only the first segment resolves
/// names and is itself `token (" " token)*`; trailing segments (for example
/// `format:...`) are opaque to the built-in rules and interpreted only by
/// custom mappers. An empty first segment yields no candidates.
pub(crate) fn candidate_names(tag: &str) -> Vec<&str> {
	let head = first_segment(tag);
	if head.is_empty() {
		return Vec::new();
	}
	head.split(' ').collect()
}

/// First candidate name from a raw tag, used when emitting keys.
pub(crate) fn key_name(tag: &str) -> Option<&str> {
	let head = first_segment(tag).split(' ').next().unwrap_or("");
	if head.is_empty() { None } else { Some(head) }
}

fn first_segment(tag: &str) -> &str {
	tag.split(';').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
	use super::{candidate_names, key_name};

	#[test]
	fn empty_tag_yields_no_candidates() {
		assert!(candidate_names("").is_empty());
		assert_eq!(key_name(""), None);
	}

	#[test]
	fn first_segment_splits_into_name_tokens() {
		assert_eq!(candidate_names("alpha beta"), vec!["alpha", "beta"]);
		assert_eq!(key_name("alpha beta"), Some("alpha"));
	}

	#[test]
	fn trailing_segments_are_opaque() {
		assert_eq!(candidate_names("when;format:2006-01-02"), vec!["when"]);
		assert_eq!(key_name("when;format:2006-01-02"), Some("when"));
	}

	#[test]
	fn leading_empty_segment_falls_back() {
		assert!(candidate_names(";format:x").is_empty());
		assert_eq!(key_name(";format:x"), None);
	}
}
