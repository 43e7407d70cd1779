// SQLステートメント分割パーサー
//
// マイグレーションファイルの内容を行単位で個別のステートメントに分割します。
// 空行と `--` で始まるコメント行は読み飛ばし、`;` で終わる行でステートメントを区切ります。

/// SQL文字列を個別のステートメントに分割
///
/// # Arguments
///
/// * `sql` - 分割するSQL文字列
///
/// # Returns
///
/// 出現順のステートメントのベクター。各行はトリムしたうえで空白1つで連結されます。
/// 終端されていない末尾のテキストには `;` を補います。
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in sql.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("--") {
            continue;
        }

        current.push(line);

        if line.ends_with(';') {
            push_statement(&mut statements, current.join(" "));
            current.clear();
        }
    }

    if !current.is_empty() {
        let mut statement = current.join(" ");
        if !statement.ends_with(';') {
            statement.push(';');
        }
        push_statement(&mut statements, statement);
    }

    statements
}

fn push_statement(statements: &mut Vec<String>, statement: String) {
    // `;` だけの文は実行しない
    if statement != ";" {
        statements.push(statement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_comment_between() {
        let statements = split_sql_statements("SELECT 1;\n-- c\nSELECT 2;");
        assert_eq!(statements, vec!["SELECT 1;", "SELECT 2;"]);
    }

    #[test]
    fn test_unterminated_statement_gets_semicolon() {
        assert_eq!(split_sql_statements("SELECT 1"), vec!["SELECT 1;"]);
        assert_eq!(
            split_sql_statements("SELECT 1;\nSELECT\n  2"),
            vec!["SELECT 1;", "SELECT 2;"]
        );
    }

    #[test]
    fn test_multiline_statement_joined_with_spaces() {
        let sql = "-- Migration for table: users\n\
                   CREATE TABLE IF NOT EXISTS users (\n    \
                   \"id\" INTEGER PRIMARY KEY,\n    \
                   \"email\" TEXT NOT NULL\n\
                   );\n\n\
                   CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_unique ON users (Email);\n\n";

        let statements = split_sql_statements(sql);
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE IF NOT EXISTS users ( \"id\" INTEGER PRIMARY KEY, \"email\" TEXT NOT NULL );",
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_unique ON users (Email);",
            ]
        );
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        assert!(split_sql_statements("").is_empty());
        assert!(split_sql_statements("\n  \n-- only a comment\n").is_empty());
        assert!(split_sql_statements(";\n  ;  \n").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            split_sql_statements("SELECT 1;\r\nSELECT 2;\r\n"),
            vec!["SELECT 1;", "SELECT 2;"]
        );
    }
}
