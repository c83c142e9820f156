/// Splits chat commands into kubectl arguments.
///
/// The alias table (`kubectl`, `kc`, `k` by default) is fixed at construction.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    aliases: Vec<String>,
}

impl Tokenizer {
    /// Create a tokenizer that strips any of `aliases` from the front of a command.
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether `word` is one of the configured aliases.
    pub fn is_alias(&self, word: &str) -> bool {
        self.aliases.iter().any(|a| a == word)
    }

    /// Split on whitespace and drop a leading alias.
    ///
    /// A lone alias (`kubectl`) is kept, since it is then the verb.
    pub fn tokenize(&self, command: &str) -> Vec<String> {
        let mut words: Vec<String> = command.split_whitespace().map(String::from).collect();
        if words.len() >= 2 && self.is_alias(&words[0]) {
            words.remove(0);
        }
        words
    }

    /// The verb of `args`, looking past an alias prefix.
    pub fn verb<'a>(&self, args: &'a [String]) -> &'a str {
        match args {
            [] => "",
            [alias, verb, ..] if self.is_alias(alias) => verb.as_str(),
            [first, ..] => first.as_str(),
        }
    }

    /// The verb together with its alias prefix, e.g. `kc get`.
    pub fn command_prefix(&self, args: &[String]) -> String {
        match args {
            [] => String::new(),
            [alias, verb, ..] if self.is_alias(alias) => format!("{alias} {verb}"),
            [first, ..] => first.clone(),
        }
    }
}

/// Drop empty tokens left behind by sloppy splitting.
pub fn delete_double_whitespace(args: Vec<String>) -> Vec<String> {
    args.into_iter().filter(|a| !a.is_empty()).collect()
}

/// Split a message into words without alias handling.
pub fn words(message: &str) -> Vec<String> {
    message.split_whitespace().map(String::from).collect()
}
