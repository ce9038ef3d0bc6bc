use raytracer::{framebuffer::Framebuffer, math::Vector3};

const KERNEL_SIZE: usize = 11;
const SIGMA: f64 = 1.5;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

fn luma(c: Vector3) -> f64 {
    0.299 * c.x + 0.587 * c.y + 0.114 * c.z
}

fn kernel() -> Vec<f64> {
    let half = (KERNEL_SIZE / 2) as f64;
    let mut weights = Vec::with_capacity(KERNEL_SIZE * KERNEL_SIZE);
    for y in 0..KERNEL_SIZE {
        for x in 0..KERNEL_SIZE {
            let (dx, dy) = (x as f64 - half, y as f64 - half);
            weights.push((-(dx * dx + dy * dy) / (2. * SIGMA * SIGMA)).exp());
        }
    }

    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Mean structural similarity of two same-sized images, compared on luma with
/// a gaussian window. 1 means identical.
pub fn ssim(a: &Framebuffer, b: &Framebuffer) -> f64 {
    assert_eq!((a.width, a.height), (b.width, b.height), "image sizes differ");
    let (w, h) = (a.width as usize, a.height as usize);
    assert!(w >= KERNEL_SIZE && h >= KERNEL_SIZE, "image smaller than the window");

    let la = a.pixels.iter().map(|&c| luma(c)).collect::<Vec<_>>();
    let lb = b.pixels.iter().map(|&c| luma(c)).collect::<Vec<_>>();
    let weights = kernel();

    // pixel values are in 0-1
    let c1 = K1 * K1;
    let c2 = K2 * K2;

    let mut total = 0.;
    let mut windows = 0;
    for y0 in 0..=h - KERNEL_SIZE {
        for x0 in 0..=w - KERNEL_SIZE {
            let (mut ma, mut mb) = (0., 0.);
            for (k, weight) in weights.iter().enumerate() {
                let i = (y0 + k / KERNEL_SIZE) * w + x0 + k % KERNEL_SIZE;
                ma += weight * la[i];
                mb += weight * lb[i];
            }

            let (mut va, mut vb, mut cov) = (0., 0., 0.);
            for (k, weight) in weights.iter().enumerate() {
                let i = (y0 + k / KERNEL_SIZE) * w + x0 + k % KERNEL_SIZE;
                let (da, db) = (la[i] - ma, lb[i] - mb);
                va += weight * da * da;
                vb += weight * db * db;
                cov += weight * da * db;
            }

            total += ((2. * ma * mb + c1) * (2. * cov + c2))
                / ((ma * ma + mb * mb + c1) * (va + vb + c2));
            windows += 1;
        }
    }

    total / windows as f64
}
