//! Operator allowlist.
//!
//! Deny-by-default: an empty list means no one may use the bot. Entries are
//! numeric Telegram user ids or usernames, with or without the leading `@`.

#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    entries: Vec<String>,
}

impl Allowlist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|e| {
                let e: String = e.into();
                e.trim().trim_start_matches('@').to_string()
            })
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries }
    }

    /// `true` when the sender matches an entry by username or numeric id.
    /// Usernames compare case-sensitively, as Telegram reports them.
    pub fn is_allowed(&self, username: &str, user_id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry == user_id || (!username.is_empty() && entry == username))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Comma-separated entries for the startup banner.
    pub fn describe(&self) -> String {
        self.entries.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_denies_all() {
        let list = Allowlist::new(Vec::<String>::new());
        assert!(list.is_empty());
        assert!(!list.is_allowed("alice", "111"));
    }

    #[test]
    fn match_by_numeric_user_id() {
        let list = Allowlist::new(["123456789"]);
        assert!(list.is_allowed("", "123456789"));
        assert!(!list.is_allowed("alice", "111"));
    }

    #[test]
    fn match_by_username_with_or_without_at() {
        let list = Allowlist::new(["@alice", "bob"]);
        assert!(list.is_allowed("alice", "1"));
        assert!(list.is_allowed("bob", "2"));
        assert!(!list.is_allowed("carol", "3"));
    }

    #[test]
    fn case_sensitive_username() {
        let list = Allowlist::new(["Alice"]);
        assert!(list.is_allowed("Alice", "1"));
        assert!(!list.is_allowed("alice", "1"));
    }

    #[test]
    fn missing_username_never_matches_blank_entry() {
        let list = Allowlist::new(["", "  ", "@"]);
        assert!(list.is_empty());
        assert!(!list.is_allowed("", "0"));
    }

    #[test]
    fn describe_lists_entries() {
        let list = Allowlist::new(["424242", "@ops"]);
        assert_eq!(list.describe(), "424242, ops");
    }
}
