use anyhow::Result;
use opencv::{
    core::{Mat, Point, Scalar, CV_8UC3},
    highgui, imgproc,
    prelude::*,
};
use steer_core::{Classification, DriveLabel, FrameSize, BOOST_LABEL};

use crate::display::{is_quit_key, FrameDisplay};

const WINDOW_NAME: &str = "Virtual Steering";

/// OpenCV window drawing the palm centers and the current labels
pub struct PreviewWindow {
    size: FrameSize,
}

impl PreviewWindow {
    pub fn new(size: FrameSize) -> Result<Self> {
        highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self { size })
    }

    fn draw(&self, classification: &Classification) -> Result<Mat> {
        let mut canvas = Mat::new_rows_cols_with_default(
            self.size.height as i32,
            self.size.width as i32,
            CV_8UC3,
            Scalar::new(40.0, 40.0, 40.0, 0.0),
        )?;

        for point in &classification.hand_points {
            imgproc::circle(
                &mut canvas,
                Point::new(point.x as i32, point.y as i32),
                12,
                Scalar::new(255.0, 255.0, 0.0, 0.0),
                -1,
                imgproc::LINE_8,
                0,
            )?;
        }

        // Red for no hands, green otherwise (BGR)
        let label_color = if classification.label == DriveLabel::NoHands {
            Scalar::new(0.0, 0.0, 255.0, 0.0)
        } else {
            Scalar::new(0.0, 255.0, 0.0, 0.0)
        };
        put_label(&mut canvas, classification.label.as_str(), 50, 1.0, label_color, 2)?;

        let hands_text = format!("Hands: {}", classification.hand_count);
        put_label(&mut canvas, &hands_text, 100, 1.0, Scalar::new(255.0, 0.0, 0.0, 0.0), 2)?;

        if classification.boost {
            put_label(&mut canvas, BOOST_LABEL, 140, 1.2, Scalar::new(0.0, 0.0, 255.0, 0.0), 3)?;
        }

        Ok(canvas)
    }
}

fn put_label(
    canvas: &mut Mat,
    text: &str,
    y: i32,
    scale: f64,
    color: Scalar,
    thickness: i32,
) -> Result<()> {
    imgproc::put_text(
        canvas,
        text,
        Point::new(50, y),
        imgproc::FONT_HERSHEY_SIMPLEX,
        scale,
        color,
        thickness,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}

impl FrameDisplay for PreviewWindow {
    fn show(&mut self, classification: &Classification) -> Result<bool> {
        let canvas = self.draw(classification)?;
        highgui::imshow(WINDOW_NAME, &canvas)?;

        Ok(is_quit_key(highgui::wait_key(1)?))
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(WINDOW_NAME) {
            log::warn!("Failed to close preview window: {}", e);
        }
    }
}
