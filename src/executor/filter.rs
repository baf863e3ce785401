//! 등호 조건 평가.
//!
//! 모든 값은 문자열로 비교합니다. 숫자 변환은 없으므로 `"01"`과 `"1"`은 다릅니다.

use crate::query::{ColumnRef, Condition, Connective, Operand};

/// 조인된 행 안의 테이블 하나.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub table: &'a str,
    pub header: &'a [String],
    pub row: &'a [String],
}

/// 조건 목록을 묶는 방식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConditionMode {
    /// 왼쪽부터 차례로 접습니다. AND와 OR 사이에 우선순위가 없습니다.
    #[default]
    LeftFold,
    /// AND가 OR보다 먼저 묶입니다.
    Precedence,
}

/// 테이블이나 컬럼을 찾지 못하면 빈 문자열입니다.
///
/// 같은 테이블이 여러 번 묶여 있으면 마지막 것이 보입니다.
pub fn resolve<'a>(bindings: &[Binding<'a>], column: &ColumnRef) -> &'a str {
    let Some(binding) = bindings
        .iter()
        .rev()
        .find(|binding| binding.table == column.table.as_ref())
    else {
        return "";
    };
    binding
        .header
        .iter()
        .position(|name| name.as_str() == column.column.as_ref())
        .and_then(|index| binding.row.get(index))
        .map_or("", String::as_str)
}

pub fn matches(cond: &Condition, bindings: &[Binding]) -> bool {
    let left = resolve(bindings, &cond.left);
    let right = match &cond.right {
        Operand::Literal(value) => value.as_ref(),
        Operand::Column(column) => resolve(bindings, column),
    };
    left == right
}

pub fn evaluate(mode: ConditionMode, filters: &[Condition], bindings: &[Binding]) -> bool {
    match mode {
        ConditionMode::LeftFold => left_fold(filters, bindings),
        ConditionMode::Precedence => precedence(filters, bindings),
    }
}

/// 빈 목록은 참입니다. 알 수 없는 연결자 뒤의 조건은 결과에 반영되지 않습니다.
fn left_fold(filters: &[Condition], bindings: &[Binding]) -> bool {
    let Some(first) = filters.first() else {
        return true;
    };
    let mut result = matches(first, bindings);
    for pair in filters.windows(2) {
        let curr = matches(&pair[1], bindings);
        match pair[0].next {
            Some(Connective::And) => result = result && curr,
            Some(Connective::Or) => result = result || curr,
            None => {}
        }
    }
    result
}

fn precedence(filters: &[Condition], bindings: &[Binding]) -> bool {
    let Some(first) = filters.first() else {
        return true;
    };
    // OR로 나뉜 AND 묶음들 중 하나라도 참이면 참
    let mut any = false;
    let mut group = matches(first, bindings);
    for pair in filters.windows(2) {
        match pair[0].next {
            Some(Connective::And) => group = group && matches(&pair[1], bindings),
            Some(Connective::Or) => {
                any = any || group;
                group = matches(&pair[1], bindings);
            }
            None => {}
        }
    }
    any || group
}
