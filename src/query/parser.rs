use super::lexer::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Delete,
    Unknown,
}

/// `table.column` 참조. 점이 없으면 두 필드 모두 비어 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Box<str>,
    pub column: Box<str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(Box<str>),
    Column(ColumnRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// 등호 조건 하나. `op`가 `None`이면 입력에 `=`가 없었던 경우입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub left: ColumnRef,
    pub op: Option<char>,
    pub right: Operand,
    // 다음 조건과 이어주는 연결자
    pub next: Option<Connective>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    pub columns: Vec<ColumnRef>,
    pub tables: Vec<Box<str>>,
    pub filters: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insert {
    pub table: Box<str>,
    pub values: Vec<Box<str>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delete {
    pub table: Box<str>,
    pub filters: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Select(Select),
    Insert(Insert),
    Delete(Delete),
}

/// 첫 키워드로 쿼리 종류를 판별합니다. 대소문자는 구분하지 않습니다.
pub fn classify(src: &str) -> QueryKind {
    let upper = src.to_uppercase();
    if upper.starts_with("SELECT") {
        QueryKind::Select
    } else if upper.starts_with("INSERT") {
        QueryKind::Insert
    } else if upper.starts_with("DELETE") {
        QueryKind::Delete
    } else {
        QueryKind::Unknown
    }
}

/// 토큰 목록 위를 걷는 파서.
///
/// 구조 검증은 하지 않습니다. 토큰이 모자라면 해당 필드는 빈 값으로 남고,
/// 실행 단계에서 "일치하는 행 없음"이나 빈 프로젝션으로 이어집니다.
pub struct Parser {
    tokens: Vec<String>,
    pos: usize,
}

impl Parser {
    pub fn new(src: &str) -> Self {
        Parser {
            tokens: tokenize(src),
            pos: 0,
        }
    }

    pub fn parse(src: &str) -> Option<Stmt> {
        match classify(src) {
            QueryKind::Select => Some(Stmt::Select(Parser::new(src).select())),
            QueryKind::Insert => Some(Stmt::Insert(Parser::new(src).insert())),
            QueryKind::Delete => Some(Stmt::Delete(Parser::new(src).delete())),
            QueryKind::Unknown => None,
        }
    }

    fn curr(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn walk(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        self.curr()
            .is_some_and(|token| token.eq_ignore_ascii_case(keyword))
    }

    fn skip_keyword(&mut self, keyword: &str) {
        if self.is_keyword(keyword) {
            self.pos += 1;
        }
    }

    fn skip_token(&mut self, token: &str) {
        if self.curr() == Some(token) {
            self.pos += 1;
        }
    }

    /// `SELECT t.a, u.b FROM t, u [WHERE ...]`
    pub fn select(mut self) -> Select {
        let mut query = Select::default();
        // SELECT
        self.walk();
        while let Some(token) = self.curr()
            && !self.is_keyword("FROM")
        {
            // 점이 없는 컬럼은 프로젝션에 들어가지 않습니다.
            if token != ","
                && let Some(column) = split_ref(token)
            {
                query.columns.push(column);
            }
            self.pos += 1;
        }
        self.skip_keyword("FROM");
        while let Some(token) = self.curr()
            && !self.is_keyword("WHERE")
        {
            if token != "," {
                query.tables.push(token.into());
            }
            self.pos += 1;
        }
        query.filters = self.filters();
        query
    }

    /// `INSERT INTO t VALUES ('a', 'b')`
    pub fn insert(mut self) -> Insert {
        let mut query = Insert::default();
        // INSERT
        self.walk();
        self.skip_keyword("INTO");
        if let Some(table) = self.walk() {
            query.table = table.into();
        }
        self.skip_keyword("VALUES");
        self.skip_token("(");
        while let Some(token) = self.curr()
            && token != ")"
        {
            if token != "," {
                query.values.push(strip_quotes(token).into());
            }
            self.pos += 1;
        }
        query
    }

    /// `DELETE FROM t [WHERE ...]`
    pub fn delete(mut self) -> Delete {
        let mut query = Delete::default();
        // DELETE
        self.walk();
        self.skip_keyword("FROM");
        if let Some(table) = self.walk() {
            query.table = table.into();
        }
        query.filters = self.filters();
        query
    }

    fn filters(&mut self) -> Vec<Condition> {
        let mut filters = Vec::new();
        if !self.is_keyword("WHERE") {
            return filters;
        }
        self.pos += 1;
        while self.curr().is_some() {
            let cond = self.condition();
            let more = cond.next.is_some();
            filters.push(cond);
            if !more {
                break;
            }
        }
        filters
    }

    fn condition(&mut self) -> Condition {
        let left = self
            .walk()
            .and_then(|token| split_ref(&token))
            .unwrap_or_default();
        let op = if self.curr() == Some("=") {
            self.pos += 1;
            Some('=')
        } else {
            None
        };
        let right = match self.walk() {
            Some(token) if token.starts_with('\'') => Operand::Literal(strip_quotes(&token).into()),
            Some(token) => Operand::Column(split_ref(&token).unwrap_or_default()),
            None => Operand::Column(ColumnRef::default()),
        };
        let next = if self.is_keyword("AND") {
            Some(Connective::And)
        } else if self.is_keyword("OR") {
            Some(Connective::Or)
        } else {
            None
        };
        if next.is_some() {
            self.pos += 1;
        }
        Condition {
            left,
            op,
            right,
            next,
        }
    }
}

// 첫 번째 점을 기준으로 나눕니다.
fn split_ref(token: &str) -> Option<ColumnRef> {
    let (table, column) = token.split_once('.')?;
    Some(ColumnRef {
        table: table.into(),
        column: column.into(),
    })
}

fn strip_quotes(token: &str) -> &str {
    let token = token.trim();
    if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}
