use regex::Regex;

/// Matches a leading `@<bot name>` mention, ignoring case.
#[derive(Debug, Clone)]
pub struct BotMention {
    regex: Regex,
}

impl BotMention {
    /// Build the matcher for `bot_name`.
    pub fn new(bot_name: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("(?i)^@{}", regex::escape(bot_name)))?;
        Ok(Self { regex })
    }

    /// Strip the mention from the start of `message`.
    ///
    /// Returns `None` when the message is not addressed to the bot. The
    /// remainder keeps its leading whitespace.
    pub fn find_and_trim<'a>(&self, message: &'a str) -> Option<&'a str> {
        let found = self.regex.find(message)?;
        Some(&message[found.end()..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trim(input: &str) -> Option<&str> {
        BotMention::new("Kubegate").unwrap().find_and_trim(input)
    }

    #[test]
    fn mention() {
        assert_eq!(trim("@Kubegate get pods"), Some(" get pods"));
    }

    #[test]
    fn lowercase() {
        assert_eq!(trim("@kubegate get pods"), Some(" get pods"));
    }

    #[test]
    fn uppercase() {
        assert_eq!(trim("@KUBEGATE get pods"), Some(" get pods"));
    }

    #[test]
    fn not_at_the_beginning() {
        assert_eq!(trim("Not at the beginning @Kubegate get pods"), None);
    }

    #[test]
    fn different_mention() {
        assert_eq!(trim("@kubegait get pods"), None);
    }

    #[test]
    fn regex_metacharacters_in_name() {
        let m = BotMention::new("kube.gate").unwrap();
        assert_eq!(m.find_and_trim("@kube.gate status"), Some(" status"));
        assert_eq!(m.find_and_trim("@kubexgate status"), None);
    }
}
