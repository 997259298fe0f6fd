//! Fixed-width zones: `width_pips × pip size`.

use super::{SizedWidth, ZoneContext, ZoneSizer, ZoneSizing};
use crate::config::ZoneMethod;

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWidth;

impl ZoneSizer for FixedWidth {
    fn method(&self) -> ZoneMethod {
        ZoneMethod::Fixed
    }

    fn half_width(&self, ctx: &ZoneContext<'_>) -> SizedWidth {
        let pips = ctx.config.width_pips;
        SizedWidth {
            half_width: pips * ctx.pip_size,
            sizing: ZoneSizing::Fixed { pips },
        }
    }
}
