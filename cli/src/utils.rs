use maactl_core::error::CliError;

/// Split repeated `--set KEY=VALUE` arguments.
/// An empty value (`--set report=`) leaves the option unset.
pub fn parse_set_pairs(raw: &[String]) -> Result<Vec<(String, String)>, CliError> {
    let mut out = Vec::with_capacity(raw.len());
    for item in raw {
        let (k, v) = item.split_once('=').ok_or_else(|| {
            CliError::Config(format!("invalid --set {item:?} (expected KEY=VALUE)"))
        })?;
        let key = k.trim();
        if key.is_empty() {
            return Err(CliError::Config(format!("invalid --set {item:?} (empty key)")));
        }
        out.push((key.to_string(), v.trim().to_string()));
    }
    Ok(out)
}

/// Repeated `--input` values become one newline-delimited input.
pub fn join_inputs(inputs: &[String]) -> String {
    inputs.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_set_pairs() {
        let pairs = parse_set_pairs(&[
            "times=3".to_string(),
            " report_to_penguin = true".to_string(),
            "squad=".to_string(),
        ])
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("times".to_string(), "3".to_string()),
                ("report_to_penguin".to_string(), "true".to_string()),
                ("squad".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_parse_set_pairs_rejects_malformed() {
        assert!(matches!(
            parse_set_pairs(&["times".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(parse_set_pairs(&["=3".to_string()]).is_err());
    }

    #[test]
    fn test_join_inputs() {
        assert_eq!(
            join_inputs(&["maa://1".to_string(), "maa://2s".to_string()]),
            "maa://1\nmaa://2s"
        );
        assert_eq!(join_inputs(&[]), "");
    }
}
