/*! Font metrics for the paragraph builder.

The typesetter does not render glyphs; it only needs to know how wide a run of
text is. This crate provides exactly that:

1. the width tables of the fourteen [standard fonts](standard::StandardFont)
   every PDF viewer has built in,
2. the [`FontMetrics`](metrics::FontMetrics) trait and a sized [`Font`](metrics::Font),
3. the [`Shaper`](shaper::Shaper) boundary together with a
   [`SimpleShaper`](shaper::SimpleShaper) that maps one character to one glyph.

```
use khipu_fonts::metrics::Font;
use khipu_fonts::standard::StandardFont;
let helvetica = Font::standard(StandardFont::Helvetica, 10);
assert!(helvetica.text_width("Hello") > 0);
```
*/

pub mod metrics;
pub mod shaper;
pub mod standard;
mod parsing;

/// A [`HashMap`](std::collections::HashMap) with [`rustc_hash::FxBuildHasher`] as hasher.
pub type HMap<A,B> = rustc_hash::FxHashMap<A,B>;
