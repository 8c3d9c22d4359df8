/*! Paragraph shaping in the tradition of TeX.

A paragraph of text is turned into a [`Khipu`](khipu::Khipu), a flat sequence of
boxes, glue, penalties and discretionary hyphens, by the
[`Khipukamayuq`](khipukamayuq::Khipukamayuq). The [line breakers](linebreak) then
choose where its lines end.

```
use khipu_engine::prelude::*;
use khipu_fonts::metrics::Font;
use khipu_fonts::standard::StandardFont;

let kamayuq = Khipukamayuq::new(PipelineConfig::new(Font::standard(StandardFont::Helvetica,10)));
let regs = TypesettingRegisters::new();
let khipu = kamayuq.encode_str("The quick brown fox jumps over the lazy dog!",&regs,Discard);
let parshape = RectangularParshape::new(Dimen::BP * 100).unwrap();
let breaks = knuthplass::find_breakpoints(&mut Cursor::new(&khipu),&parshape,&LineBreakParameters::default(),Discard);
assert!(breaks.line_count() > 1);
```
*/

pub mod utils;
pub mod dimen;
pub mod registers;
pub mod khipu;
pub mod segment;
pub mod hyphenation;
pub mod khipukamayuq;
pub mod linebreak;


pub mod prelude {
    pub use crate::dimen::Dimen;
    pub use crate::khipu::{Cursor, Khipu, Mark};
    pub use crate::khipu::knots::{Discretionary, Glue, Knot, TextBox};
    pub use crate::khipukamayuq::{Khipukamayuq, PipelineConfig};
    pub use crate::linebreak::{firstfit, knuthplass, Breakpoints, LineBreakParameters, Parshape, RectangularParshape, VariableParshape};
    pub use crate::registers::{ParameterKey, TypesettingRegisters};
    pub use crate::utils::diagnostics::{Collect, Diagnostics, Discard, Log};
    pub use crate::utils::errors::ConfigError;
}
