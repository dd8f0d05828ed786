use image::{Rgb, RgbImage};
use lazy_static::lazy_static;
use ndarray::Array2;

lazy_static! {
    /// One color per root, cycled when the degree exceeds the palette.
    pub static ref DEFAULT_PALETTE: Vec<Rgb<u8>> = vec![
        Rgb([0xff, 0x00, 0x00]),
        Rgb([0x00, 0xff, 0x00]),
        Rgb([0x00, 0x00, 0xff]),
    ];
}

pub trait Painter {
    fn index_color(&self, index: i16) -> Rgb<u8>;

    /// Maps an index grid to pixels; unclassified entries (below zero)
    /// paint black.
    fn paint(&self, indices: &Array2<i16>) -> RgbImage {
        let width: u32 = indices.ncols().try_into().unwrap();
        let height: u32 = indices.nrows().try_into().unwrap();

        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let index = indices[[y as usize, x as usize]];
                let color = if index < 0 {
                    Rgb([0, 0, 0])
                } else {
                    self.index_color(index)
                };
                img.put_pixel(x, y, color);
            }
        }
        img
    }
}

pub struct IndexPainter {
    palette: Vec<Rgb<u8>>,
}

impl IndexPainter {
    pub fn new(palette: Vec<Rgb<u8>>) -> Self {
        assert!(!palette.is_empty(), "empty palette");
        Self { palette }
    }
}

impl Default for IndexPainter {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.clone())
    }
}

impl Painter for IndexPainter {
    fn index_color(&self, index: i16) -> Rgb<u8> {
        self.palette[index as usize % self.palette.len()]
    }
}
