use super::Command;
use crate::Data;

pub(super) fn help(data: &Data) -> String {
    let mut lines: Vec<String> = Command::ALL
        .iter()
        .map(|cmd| cmd.usage().to_string())
        .collect();
    lines.push("*[tickers...]* pull stock quotes for list of tickers".to_string());

    if let Some(email) = &data.support_email {
        lines.push(String::new());
        lines.push(format!("Questions or problems? Contact {email}"));
    }

    lines.join("\n")
}
