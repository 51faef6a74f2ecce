use grade_grid::image::{GrayImageU8, ImageView, PageImage};

const INK: u8 = 20;
const PEN: u8 = 35;
const PAPER: u8 = 250;
const LINE: usize = 3;

/// Answer sheet drawn on a blank page: one ruled row of boxes inside the
/// default answer region, with X marks in the requested boxes.
#[derive(Clone, Debug)]
pub struct SheetSpec {
    pub width: usize,
    pub height: usize,
    /// Left edge of the first vertical line.
    pub left: usize,
    /// Top edge of the upper horizontal line.
    pub top: usize,
    /// Distance between the two horizontal lines.
    pub row_height: usize,
    pub integer_lines: usize,
    pub integer_pitch: usize,
    pub fractional_lines: usize,
    pub fractional_pitch: usize,
    /// Distance from the last integer line to the first fractional one.
    pub section_gap: usize,
    pub integer_marks: Vec<usize>,
    pub fractional_marks: Vec<usize>,
    /// Paper darkening from the left to the right edge.
    pub illumination_drop: u8,
}

impl Default for SheetSpec {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            left: 30,
            top: 259,
            row_height: 65,
            integer_lines: 22,
            integer_pitch: 30,
            fractional_lines: 5,
            fractional_pitch: 40,
            section_gap: 60,
            integer_marks: Vec::new(),
            fractional_marks: Vec::new(),
            illumination_drop: 0,
        }
    }
}

impl SheetSpec {
    /// Sheet marked with `integer` and the fractional box `fraction`.
    pub fn marked(integer: usize, fraction: usize) -> Self {
        Self {
            integer_marks: vec![integer],
            fractional_marks: vec![fraction],
            ..Default::default()
        }
    }

    pub fn integer_line_x(&self) -> Vec<usize> {
        (0..self.integer_lines)
            .map(|k| self.left + self.integer_pitch * k)
            .collect()
    }

    pub fn fractional_line_x(&self) -> Vec<usize> {
        let Some(&last) = self.integer_line_x().last() else {
            return Vec::new();
        };
        (0..self.fractional_lines)
            .map(|k| last + self.section_gap + self.fractional_pitch * k)
            .collect()
    }

    pub fn render_gray(&self) -> GrayImageU8 {
        let mut img = GrayImageU8::filled(self.width, self.height, PAPER);
        if self.illumination_drop > 0 {
            for y in 0..self.height {
                for x in 0..self.width {
                    let drop = (x * self.illumination_drop as usize / self.width) as u8;
                    img.set(x, y, PAPER - drop);
                }
            }
        }

        let int_x = self.integer_line_x();
        let frac_x = self.fractional_line_x();
        let all_x: Vec<usize> = int_x.iter().chain(frac_x.iter()).copied().collect();
        let (Some(&x_first), Some(&x_last)) = (all_x.first(), all_x.last()) else {
            return img;
        };
        let bottom = self.top + self.row_height;

        for y in [self.top, bottom] {
            fill(&mut img, x_first, y, x_last + LINE, y + LINE, INK);
        }
        for &x in &all_x {
            fill(&mut img, x, self.top, x + LINE, bottom + LINE, INK);
        }

        for &i in &self.integer_marks {
            self.draw_mark(&mut img, &int_x, i);
        }
        for &i in &self.fractional_marks {
            self.draw_mark(&mut img, &frac_x, i);
        }
        img
    }

    pub fn render(&self) -> PageImage {
        PageImage::from_gray(self.render_gray())
    }

    /// X of two 3 px strokes centred in the bottom half of box `index`.
    fn draw_mark(&self, img: &mut GrayImageU8, lines: &[usize], index: usize) {
        let cx = (lines[index] + lines[index + 1]) / 2 + 1;
        let cy = self.top + 1 + self.row_height * 72 / 100;
        for t in -8i64..=8 {
            for d in -1i64..=1 {
                let y = (cy as i64 + t) as usize;
                img.set((cx as i64 + t + d) as usize, y, PEN);
                img.set((cx as i64 - t + d) as usize, y, PEN);
            }
        }
    }
}

fn fill(img: &mut GrayImageU8, x0: usize, y0: usize, x1: usize, y1: usize, v: u8) {
    for y in y0..y1 {
        for x in x0..x1 {
            img.set(x, y, v);
        }
    }
}

/// Same pixels as `gray`, stored as three equal channels.
pub fn to_rgb(gray: &GrayImageU8) -> PageImage {
    let data = gray.data().iter().flat_map(|&v| [v, v, v]).collect();
    PageImage::from_rgb(gray.width(), gray.height(), data)
        .expect("rgb buffer matches the gray extent")
}
