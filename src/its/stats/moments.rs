use crate::its::capture::ImageBuffer;

/// Mean of each channel, accumulated in f64.
pub fn channel_means(image: &ImageBuffer) -> Vec<f64> {
    let mut sums = vec![0.0f64; image.channels];
    for px in image.data.chunks_exact(image.channels) {
        for (sum, &v) in sums.iter_mut().zip(px) {
            *sum += f64::from(v);
        }
    }
    let n = (image.width * image.height) as f64;
    sums.into_iter().map(|s| s / n).collect()
}

/// Population variance of each channel.
pub fn channel_variances(image: &ImageBuffer) -> Vec<f64> {
    let means = channel_means(image);
    let mut acc = vec![0.0f64; image.channels];
    for px in image.data.chunks_exact(image.channels) {
        for ((a, &v), m) in acc.iter_mut().zip(px).zip(&means) {
            let d = f64::from(v) - m;
            *a += d * d;
        }
    }
    let n = (image.width * image.height) as f64;
    acc.into_iter().map(|a| a / n).collect()
}
