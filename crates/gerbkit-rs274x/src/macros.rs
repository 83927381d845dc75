//! Aperture macros (`%AM...%`)
//!
//! A macro is a name followed by `*`-terminated primitive records. Each
//! record starts with a numeric primitive code and carries a parameter
//! list whose length is fixed per primitive, except for outlines where
//! the vertex count read from the record itself decides how many
//! coordinates follow.
//!
//! ```text
//! %AMDONUT*
//! 1,1,$1,0,0*
//! 1,0,$2,0,0*%
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use crate::cursor::LineCursor;
use crate::error::{Rs274xError, Rs274xResult};
use crate::scanner::{read_double, read_int, skip_to_block_end};

/// Primitive code `0`: free text up to `*`
const COMMENT_PRIMITIVE: i64 = 0;

/// Macro primitive kinds by their numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// 1
    Circle,
    /// 2, line between two points
    VectorLine,
    /// 20, same as 2
    VectorLine20,
    /// 21, line given by its center
    CenterLine,
    /// 22, line given by its lower-left corner
    LowerLeftLine,
    /// 3
    EndOfMacro,
    /// 4
    Outline,
    /// 5, regular polygon
    Polygon,
    /// 6
    Moire,
    /// 7
    Thermal,
    /// Any other code; read with the circle parameter count
    Unknown(i64),
}

impl PrimitiveKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Circle,
            2 => Self::VectorLine,
            20 => Self::VectorLine20,
            21 => Self::CenterLine,
            22 => Self::LowerLeftLine,
            3 => Self::EndOfMacro,
            4 => Self::Outline,
            5 => Self::Polygon,
            6 => Self::Moire,
            7 => Self::Thermal,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Circle => 1,
            Self::VectorLine => 2,
            Self::VectorLine20 => 20,
            Self::CenterLine => 21,
            Self::LowerLeftLine => 22,
            Self::EndOfMacro => 3,
            Self::Outline => 4,
            Self::Polygon => 5,
            Self::Moire => 6,
            Self::Thermal => 7,
            Self::Unknown(code) => code,
        }
    }

    /// Parameters read for this primitive. For outlines this is only the
    /// fixed head; the vertex list follows.
    pub fn param_count(self) -> usize {
        match self {
            Self::Circle | Self::Unknown(_) => 4,
            Self::VectorLine | Self::VectorLine20 => 7,
            Self::CenterLine | Self::LowerLeftLine => 6,
            Self::EndOfMacro => 0,
            Self::Outline | Self::Polygon => 4,
            Self::Moire => 9,
            Self::Thermal => 6,
        }
    }
}

/// One primitive parameter: a literal or a `$n` variable reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroParam {
    pub value: f64,
    /// `false` for `$n` references, where `value` is the variable number
    pub immediate: bool,
}

impl MacroParam {
    pub fn immediate(value: f64) -> Self {
        Self {
            value,
            immediate: true,
        }
    }

    pub fn variable(index: f64) -> Self {
        Self {
            value: index,
            immediate: false,
        }
    }
}

impl From<MacroParam> for gerber_types::MacroDecimal {
    fn from(param: MacroParam) -> Self {
        if param.immediate {
            Self::Value(param.value)
        } else {
            Self::Variable(param.value.max(0.0) as u32)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroPrimitive {
    pub kind: PrimitiveKind,
    pub params: Vec<MacroParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApertureMacro {
    pub name: String,
    pub primitives: Vec<MacroPrimitive>,
}

/// Macros of one layer, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroSet {
    macros: HashMap<String, ApertureMacro>,
}

impl MacroSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a macro. A macro with the same name is replaced and returned.
    pub fn insert(&mut self, am: ApertureMacro) -> Option<ApertureMacro> {
        self.macros.insert(am.name.clone(), am)
    }

    pub fn get(&self, name: &str) -> Option<&ApertureMacro> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApertureMacro> {
        self.macros.values()
    }
}

/// Read a macro definition starting right after the `AM` code.
///
/// Stops on the closing `%` and leaves the cursor on it. Fails with
/// [`Rs274xError::UnexpectedEof`] if the stream ends first; the partly
/// read macro is dropped.
pub fn read_macro(cursor: &mut LineCursor) -> Rs274xResult<ApertureMacro> {
    let mut am = ApertureMacro {
        name: read_macro_name(cursor),
        primitives: Vec::new(),
    };
    debug!(name = %am.name, "reading aperture macro");

    loop {
        if cursor.peek() == Some(b'*') {
            cursor.advance();
        }
        cursor.skip_whitespace();

        if cursor.is_exhausted() {
            if !cursor.refill()? {
                return Err(Rs274xError::UnexpectedEof);
            }
            continue;
        }

        if cursor.peek() == Some(b'%') {
            break;
        }

        let start = cursor.position();
        let code = read_int(cursor);
        if cursor.position() == start {
            warn!(
                macro_name = %am.name,
                "skipping macro record without a primitive code"
            );
            cursor.advance();
            if !skip_to_block_end(cursor)? {
                return Err(Rs274xError::UnexpectedEof);
            }
            continue;
        }
        if code == COMMENT_PRIMITIVE {
            if !skip_to_block_end(cursor)? {
                return Err(Rs274xError::UnexpectedEof);
            }
            continue;
        }

        let kind = PrimitiveKind::from_code(code);
        let mut params = Vec::with_capacity(kind.param_count());
        read_params(cursor, kind.param_count(), &mut params)?;

        if kind == PrimitiveKind::Outline {
            let vertices = params.get(1).map(|p| p.value as i64).unwrap_or(0).max(0);
            let extra = usize::try_from(vertices).unwrap_or(0) * 2 + 1;
            read_params(cursor, extra, &mut params)?;
        }

        trace!(?kind, params = params.len(), "macro primitive");
        am.primitives.push(MacroPrimitive { kind, params });
    }

    Ok(am)
}

/// Name runs up to `*`, which is consumed
fn read_macro_name(cursor: &mut LineCursor) -> String {
    let mut name = Vec::new();
    while let Some(b) = cursor.peek() {
        match b {
            b'*' => {
                cursor.advance();
                break;
            }
            b'%' | b'\r' | b'\n' => break,
            _ => {
                name.push(b);
                cursor.advance();
            }
        }
    }
    String::from_utf8_lossy(&name).into_owned()
}

/// Read up to `count` parameters, stopping early at `*` or `%`.
/// A record may continue on the next physical line.
fn read_params(
    cursor: &mut LineCursor,
    count: usize,
    params: &mut Vec<MacroParam>,
) -> Rs274xResult<()> {
    let mut read = 0;
    while read < count {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => {
                if !cursor.refill()? {
                    return Err(Rs274xError::UnexpectedEof);
                }
                continue;
            }
            Some(b'*' | b'%') => break,
            Some(_) => {}
        }

        let immediate = if cursor.peek() == Some(b'$') {
            cursor.advance();
            false
        } else {
            true
        };
        let before = cursor.position();
        let value = read_double(cursor);
        if immediate && cursor.position() == before {
            // not a number; leave it for the block resync
            break;
        }
        params.push(MacroParam { value, immediate });
        read += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_after_code(text: &str) -> LineCursor {
        let mut c = LineCursor::from_text(text);
        c.refill().unwrap();
        c
    }

    #[test]
    fn test_fixed_param_counts() {
        assert_eq!(PrimitiveKind::from_code(1).param_count(), 4);
        assert_eq!(PrimitiveKind::from_code(2).param_count(), 7);
        assert_eq!(PrimitiveKind::from_code(20).param_count(), 7);
        assert_eq!(PrimitiveKind::from_code(21).param_count(), 6);
        assert_eq!(PrimitiveKind::from_code(22).param_count(), 6);
        assert_eq!(PrimitiveKind::from_code(3).param_count(), 0);
        assert_eq!(PrimitiveKind::from_code(5).param_count(), 4);
        assert_eq!(PrimitiveKind::from_code(6).param_count(), 9);
        assert_eq!(PrimitiveKind::from_code(7).param_count(), 6);
        assert_eq!(PrimitiveKind::from_code(99), PrimitiveKind::Unknown(99));
        assert_eq!(PrimitiveKind::Unknown(99).param_count(), 4);
    }

    #[test]
    fn test_circle_with_variables() {
        let mut c = cursor_after_code("DONUT*1,1,$1,0,0*1,0,$2,0,0*%\n");
        let am = read_macro(&mut c).unwrap();
        assert_eq!(am.name, "DONUT");
        assert_eq!(am.primitives.len(), 2);
        let first = &am.primitives[0];
        assert_eq!(first.kind, PrimitiveKind::Circle);
        assert_eq!(first.params[1], MacroParam::variable(1.0));
        assert_eq!(first.params[0], MacroParam::immediate(1.0));
        assert_eq!(c.peek(), Some(b'%'));
    }

    #[test]
    fn test_params_convert_to_macro_decimals() {
        let mut c = cursor_after_code("D*1,1,$2,0,0*%");
        let am = read_macro(&mut c).unwrap();
        let decimals: Vec<gerber_types::MacroDecimal> = am.primitives[0]
            .params
            .iter()
            .copied()
            .map(Into::into)
            .collect();
        assert!(matches!(decimals[0], gerber_types::MacroDecimal::Value(v) if v == 1.0));
        assert!(matches!(decimals[1], gerber_types::MacroDecimal::Variable(2)));
    }

    #[test]
    fn test_outline_vertex_count_zero() {
        let mut c = cursor_after_code("O*4,1,0,1.5,2.5,0*%");
        let am = read_macro(&mut c).unwrap();
        assert_eq!(am.primitives[0].params.len(), 5);
    }

    #[test]
    fn test_outline_negative_vertex_count_reads_closing_param() {
        let mut c = cursor_after_code("O*4,1,-2,0,0,45*%");
        let am = read_macro(&mut c).unwrap();
        let values: Vec<f64> = am.primitives[0].params.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, -2.0, 0.0, 0.0, 45.0]);
    }

    #[test]
    fn test_comment_primitive_is_skipped() {
        let mut c = cursor_after_code("C*0 a thermal, sort of*7,0,0,1,0.8,0.1,45*%");
        let am = read_macro(&mut c).unwrap();
        assert_eq!(am.primitives.len(), 1);
        assert_eq!(am.primitives[0].kind, PrimitiveKind::Thermal);
        assert_eq!(am.primitives[0].params.len(), 6);
    }

    #[test]
    fn test_garbage_record_does_not_loop() {
        let mut c = cursor_after_code("G*junk*1,1,0.5,0,0*%");
        let am = read_macro(&mut c).unwrap();
        assert_eq!(am.primitives.len(), 1);
    }

    #[test]
    fn test_eof_inside_macro_fails() {
        let mut c = cursor_after_code("BROKEN*\n1,1,0.5,0,0*\n");
        assert!(matches!(
            read_macro(&mut c),
            Err(Rs274xError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_macro_set_last_definition_wins() {
        let mut set = MacroSet::new();
        assert!(set.insert(ApertureMacro {
            name: "A".into(),
            primitives: vec![],
        })
        .is_none());
        let replaced = set.insert(ApertureMacro {
            name: "A".into(),
            primitives: vec![MacroPrimitive {
                kind: PrimitiveKind::EndOfMacro,
                params: vec![],
            }],
        });
        assert!(replaced.is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("A").map(|m| m.primitives.len()), Some(1));
    }
}
