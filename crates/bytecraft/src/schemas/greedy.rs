//! Repetition until the input runs out or an item fails.

use std::borrow::Cow;

use crate::{
    context::{BuildingContext, ParsingContext},
    errors::Error,
    schema::{Schema, build_child, parse_child},
};

/// As many items as parse, stopping at the end of the window or at the first failure.
///
/// A failed attempt is rolled back: the cursor and scope stack return to where
/// they were before the attempt, so the fields after the range parse from the
/// right offset. The error ends the repetition and is not reported. An item
/// that consumes no bytes is kept and ends the repetition.
#[derive(Debug, Clone)]
pub struct GreedyRange<S> {
    item: S,
}

pub fn greedy_range<S: Schema>(item: S) -> GreedyRange<S> {
    GreedyRange { item }
}

impl<S: Schema> Schema for GreedyRange<S> {
    type Output = Vec<S::Output>;

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("greedy_range<{}>", self.item.name()))
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<Self::Output, Error> {
        let mut items = Vec::new();
        while ctx.remaining() > 0 {
            let checkpoint = ctx.checkpoint();
            match parse_child(&self.item, ctx) {
                Ok(item) => {
                    items.push(item);
                    if ctx.offset() == checkpoint.offset {
                        ctx.log("item consumed 0 bytes, stopping greedy range");
                        break;
                    }
                }
                Err(err) => {
                    ctx.log(format_args!("greedy range stopped by item error: {err}"));
                    ctx.rewind(checkpoint);
                    break;
                }
            }
        }
        Ok(items)
    }

    fn build_in(&self, value: &Self::Output, ctx: &mut BuildingContext) -> Result<(), Error> {
        for item in value {
            build_child(&self.item, item, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schemas::{Struct, literal, uint8, uint16},
        value::{Record, Value},
    };

    #[test]
    fn test_consumes_everything() {
        let schema = greedy_range(uint16());
        assert_eq!(schema.parse(&[0, 1, 0, 2, 0, 3]), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn test_partial_item_is_rolled_back() {
        let schema = Struct::new()
            .field("items", greedy_range(uint16()))
            .field("rest", uint8());
        let record = schema.parse(&[0, 1, 0, 2, 9]).unwrap();
        assert_eq!(
            record.get("items"),
            Some(&Value::Array(vec![Value::U64(1), Value::U64(2)]))
        );
        assert_eq!(record.get("rest"), Some(&Value::U64(9)));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(greedy_range(uint8()).parse(&[]), Ok(vec![]));
    }

    #[test]
    fn test_zero_byte_item_stops() {
        let schema = greedy_range(Struct::new());
        assert_eq!(schema.parse(&[1, 2, 3]), Ok(vec![Record::new()]));
    }

    #[test]
    fn test_first_item_failure_yields_empty() {
        let schema = greedy_range(literal([0xaau8]));
        assert_eq!(schema.parse(&[0xbb, 0xaa]), Ok(vec![]));
    }

    #[test]
    fn test_build_emits_every_item() {
        let schema = greedy_range(uint16());
        assert_eq!(schema.build(&vec![1, 2]), Ok(vec![0, 1, 0, 2]));
        assert_eq!(schema.build(&vec![]), Ok(vec![]));
    }
}
