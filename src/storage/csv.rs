//! 샤드 파일의 행 인코딩. 쉼표로만 나누며 따옴표/이스케이프는 없습니다.

pub type Row = Vec<String>;

/// 한 줄을 셀로 나눕니다. 빈 줄은 셀이 없고, 끝의 빈 셀도 그대로 남깁니다.
pub fn parse_line(line: &str) -> Row {
    if line.is_empty() {
        return Row::new();
    }
    line.split(',').map(str::to_string).collect()
}

pub fn format_row<S: AsRef<str>>(row: &[S]) -> String {
    let mut out = row
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');
    out
}

/// 첫 줄(헤더)만 읽습니다.
pub fn parse_header(text: &str) -> Row {
    text.split('\n').next().map(parse_line).unwrap_or_default()
}

/// 헤더를 건너뛰고 비어 있지 않은 데이터 줄을 읽습니다.
pub fn parse_rows(text: &str) -> Vec<Row> {
    text.split('\n')
        .skip(1)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

pub fn count_rows(text: &str) -> usize {
    text.split('\n')
        .skip(1)
        .filter(|line| !line.is_empty())
        .count()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("1,Alice,30"), vec!["1", "Alice", "30"]);
        assert_eq!(parse_line("1,,30"), vec!["1", "", "30"]);
        assert_eq!(parse_line("1,Alice,"), vec!["1", "Alice", ""]);
        assert_eq!(parse_line(",,"), vec!["", "", ""]);
        assert!(parse_line("").is_empty());
    }

    #[test]
    fn test_format_row() {
        assert_eq!(format_row(&["users_pk", "name"]), "users_pk,name\n");
        assert_eq!(format_row(&[String::from("7")]), "7\n");
    }

    #[test]
    fn test_rows_skip_header_and_blank_lines() {
        let text = "t_pk,a\n1,x\n\n2,y\n";
        assert_eq!(parse_header(text), vec!["t_pk", "a"]);
        assert_eq!(parse_rows(text), vec![vec!["1", "x"], vec!["2", "y"]]);
        assert_eq!(count_rows(text), 2);
    }

    #[test]
    fn test_empty_last_cell_survives_rewrite() {
        let text = "t_pk,a,b\n1,x,\n";
        let rows = parse_rows(text);
        assert_eq!(rows, vec![vec!["1", "x", ""]]);
        let mut out = format_row(&parse_header(text));
        for row in &rows {
            out.push_str(&format_row(row));
        }
        assert_eq!(out, text);
    }

    #[test]
    fn test_header_only() {
        assert_eq!(count_rows("t_pk,a\n"), 0);
        assert!(parse_rows("t_pk,a\n").is_empty());
        assert!(parse_header("").is_empty());
    }
}
