//! Drawing backend wrapper that survives missing system fonts.
//!
//! Plotters loads fonts lazily through the platform font database. On hosts
//! without any usable font (minimal containers, WSL without fontconfig data)
//! every text operation fails with a font error, which would abort the whole
//! chart. The wrapper forwards all drawing to the inner backend and turns font
//! errors into skipped labels. Other drawing errors pass through unchanged.

use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};

/// Width of an average glyph relative to the font size, for size estimates.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

pub(crate) struct FontSafeBackend<DB> {
    inner: DB,
}

impl<DB> FontSafeBackend<DB> {
    pub(crate) fn new(inner: DB) -> Self {
        Self { inner }
    }
}

impl<DB: DrawingBackend> DrawingBackend for FontSafeBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.fill_polygon(vert, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        match self.inner.draw_text(text, style, pos) {
            Err(DrawingErrorKind::FontError(e)) => {
                log::debug!("Skipping label {:?}: {}", text, e);
                Ok(())
            }
            other => other,
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        match self.inner.estimate_text_size(text, style) {
            Err(DrawingErrorKind::FontError(_)) => Ok(approximate_text_size(text, style.size())),
            other => other,
        }
    }
}

/// Box of `text` at font `size`, assuming every glyph has the average width.
fn approximate_text_size(text: &str, size: f64) -> (u32, u32) {
    let size = size.max(1.0);
    let width = (text.chars().count() as f64 * size * GLYPH_WIDTH_RATIO).ceil();
    (width as u32, size.ceil() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::*;
    use plotters_backend::BackendTextStyle;

    /// Backend whose text calls always fail as if no font were installed.
    struct NoFontBackend {
        lines: usize,
    }

    #[derive(Debug)]
    struct NoFont;

    impl std::fmt::Display for NoFont {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "no font available")
        }
    }

    impl std::error::Error for NoFont {}

    impl DrawingBackend for NoFontBackend {
        type ErrorType = NoFont;

        fn get_size(&self) -> (u32, u32) {
            (320, 200)
        }

        fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<NoFont>> {
            Ok(())
        }

        fn present(&mut self) -> Result<(), DrawingErrorKind<NoFont>> {
            Ok(())
        }

        fn draw_pixel(
            &mut self,
            _point: BackendCoord,
            _color: BackendColor,
        ) -> Result<(), DrawingErrorKind<NoFont>> {
            Ok(())
        }

        fn draw_line<S: BackendStyle>(
            &mut self,
            _from: BackendCoord,
            _to: BackendCoord,
            _style: &S,
        ) -> Result<(), DrawingErrorKind<NoFont>> {
            self.lines += 1;
            Ok(())
        }

        fn draw_text<TStyle: BackendTextStyle>(
            &mut self,
            _text: &str,
            _style: &TStyle,
            _pos: BackendCoord,
        ) -> Result<(), DrawingErrorKind<NoFont>> {
            Err(DrawingErrorKind::FontError(Box::new(NoFont)))
        }

        fn estimate_text_size<TStyle: BackendTextStyle>(
            &self,
            _text: &str,
            _style: &TStyle,
        ) -> Result<(u32, u32), DrawingErrorKind<NoFont>> {
            Err(DrawingErrorKind::FontError(Box::new(NoFont)))
        }
    }

    #[test]
    fn test_approximate_text_size() {
        assert_eq!(approximate_text_size("Index", 10.0), (30, 10));
        assert_eq!(approximate_text_size("", 0.0), (0, 1));
    }

    #[test]
    fn test_font_errors_are_swallowed() {
        let mut backend = FontSafeBackend::new(NoFontBackend { lines: 0 });
        let style = ("sans-serif", 10).into_text_style(&backend.get_size());

        assert!(backend.draw_text("Index", &style, (0, 0)).is_ok());
        assert_eq!(backend.estimate_text_size("Index", &style).unwrap(), (30, 10));

        backend.draw_line((0, 0), (10, 10), &BLACK).unwrap();
        assert_eq!(backend.inner.lines, 1);
    }

    #[test]
    fn test_chart_renders_without_fonts() {
        let root = FontSafeBackend::new(NoFontBackend { lines: 0 }).into_drawing_area();
        let mut chart = ChartBuilder::on(&root)
            .caption("L2 Distance", ("sans-serif", 20))
            .x_label_area_size(30)
            .y_label_area_size(30)
            .build_cartesian_2d(0f64..1f64, 0f64..200f64)
            .unwrap();
        chart.configure_mesh().draw().unwrap();
        chart
            .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 150.0)], &BLACK))
            .unwrap();
        root.present().unwrap();
    }
}
