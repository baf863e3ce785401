use super::filter::Binding;
use crate::storage::Row;

/// FROM 절의 테이블 하나를 메모리에 읽어 둔 것.
#[derive(Debug, Clone, Default)]
pub struct Relation {
    pub name: Box<str>,
    pub header: Row,
    pub rows: Vec<Row>,
}

impl Relation {
    fn bind(&self, index: usize) -> Binding<'_> {
        Binding {
            table: &self.name,
            header: &self.header,
            row: &self.rows[index],
        }
    }
}

/// 나열된 테이블들의 데카르트 곱.
///
/// 첫 테이블이 가장 바깥쪽 루프이고, 각 테이블의 행은 읽은 순서를 따릅니다.
/// 테이블이 없거나 빈 테이블이 하나라도 있으면 아무것도 내지 않습니다.
#[derive(Debug, Clone)]
pub struct Join<'a> {
    relations: &'a [Relation],
    cursor: Vec<usize>,
    done: bool,
}

impl<'a> Join<'a> {
    pub fn new(relations: &'a [Relation]) -> Self {
        let mut join = Join {
            relations,
            cursor: vec![0; relations.len()],
            done: false,
        };
        join.restart();
        join
    }

    /// 처음 조합으로 되돌립니다.
    pub fn restart(&mut self) {
        self.cursor.fill(0);
        self.done = self.relations.is_empty() || self.relations.iter().any(|r| r.rows.is_empty());
    }

    // 마지막 테이블부터 자리올림하며 커서를 한 칸 옮깁니다.
    fn advance(&mut self) {
        for i in (0..self.cursor.len()).rev() {
            self.cursor[i] += 1;
            if self.cursor[i] < self.relations[i].rows.len() {
                return;
            }
            self.cursor[i] = 0;
        }
        self.done = true;
    }
}

impl<'a> Iterator for Join<'a> {
    type Item = Vec<Binding<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let relations = self.relations;
        let item = relations
            .iter()
            .zip(&self.cursor)
            .map(|(relation, &index)| relation.bind(index))
            .collect();
        self.advance();
        Some(item)
    }
}
