//! Treebank-style detokenizer.
//!
//! Both annotation layers arrive tokenized; every surface string we store or
//! match against is reassembled from token groups. Joining on plain spaces
//! mangles punctuation ("plan ." / "do n't"), which would depress fuzzy-match
//! scores across the board, so reassembly follows the usual Treebank
//! attachment rules: closing punctuation and contraction clitics bind to the
//! token on their left, opening brackets bind right, and paired double quotes
//! toggle between the two.

/// Reassemble a token sequence into natural text.
pub fn detokenize<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    // An unmatched double quote has been emitted and awaits its closer.
    let mut quote_open = false;
    // The previous token binds to the right: suppress the next separator.
    let mut suppress_space = false;

    for token in tokens {
        let token = token.as_ref();
        if token.is_empty() {
            continue;
        }

        // `` always opens, '' always closes, a plain " toggles.
        let is_quote = token == "\"" || token == "``" || token == "''";
        let closing = token == "''" || (token == "\"" && quote_open);

        let no_space = out.is_empty() || suppress_space || binds_left(token) || closing;
        if !no_space {
            out.push(' ');
        }
        // Normalize Treebank quote tokens to a plain double quote.
        out.push_str(if is_quote { "\"" } else { token });

        suppress_space = binds_right(token) || (is_quote && !closing);
        if is_quote {
            quote_open = !closing;
        }
    }

    out
}

/// Tokens that attach to the preceding token without a space.
fn binds_left(token: &str) -> bool {
    matches!(
        token,
        "." | "," | "!" | "?" | ";" | ":" | "%" | ")" | "]" | "}" | "'" | "..." | "n't"
    ) || is_clitic(token)
}

/// Tokens that attach to the following token without a space.
fn binds_right(token: &str) -> bool {
    matches!(token, "(" | "[" | "{" | "$" | "#")
}

/// Contraction clitics produced by Treebank tokenization: 's, 're, 'll, ...
fn is_clitic(token: &str) -> bool {
    token.len() > 1
        && token.starts_with('\'')
        && token[1..].chars().all(|c| c.is_ascii_alphabetic())
}
