//! Side to move lifted to the type level, so that hot paths get one copy per color

use crate::types;

pub trait Color {
    const COLOR: types::Color;
    /// Index of the first square on the color's home rank
    const HOME_OFFSET: usize;
    type Inv: Color;
}

pub struct White;
pub struct Black;

impl Color for White {
    const COLOR: types::Color = types::Color::White;
    const HOME_OFFSET: usize = 0;
    type Inv = Black;
}

impl Color for Black {
    const COLOR: types::Color = types::Color::Black;
    const HOME_OFFSET: usize = 56;
    type Inv = White;
}
