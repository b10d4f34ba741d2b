use image::{Rgb, RgbImage};
use ndarray::Array2;

/// Gray level of a snapshot code: Metallic black, Oxide gray, Void white.
fn shade(code: u8) -> u8 {
    (code.min(2) as u16 * 255 / 2) as u8
}

pub fn save_cell_states(prefix: &str, index: usize, x: &Array2<u8>) -> anyhow::Result<()> {
    let shape = x.dim();

    let mut img = RgbImage::new(shape.1 as u32, shape.0 as u32);

    for i in 0..shape.0 {
        for j in 0..shape.1 {
            let l = shade(x[[i, j]]);
            img.put_pixel(j as u32, i as u32, Rgb([l, l, l]));
        }
    }

    img.save(format!("out/{}_{:06}.png", prefix, index))?;

    Ok(())
}
