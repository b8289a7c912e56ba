//! Channel up/down-mixing
//!
//! Maps interleaved frames from a source channel layout onto the output
//! device's layout. Pure functions, safe to call from the audio thread.

/// Largest channel count a decoder session may declare
pub const MAX_CHANNELS: usize = 8;

/// Front-centre gain for stereo sources on 5.1+ outputs
pub const CENTER_GAIN: f32 = 0.7;

/// LFE gain for stereo sources on 5.1+ outputs
pub const LFE_GAIN: f32 = 0.3;

/// Rear-channel gain for stereo sources on surround outputs
pub const REAR_GAIN: f32 = 0.5;

/// Map `input` frames (`in_channels` wide) into `output` (`out_channels` wide)
///
/// Converts as many whole frames as fit in both buffers and returns that
/// frame count. Output slots the layout leaves unassigned are zeroed.
///
/// - mono: duplicated to every output channel
/// - stereo to 2+: L/R on the front pair, centre/LFE on 6+, rears on 5+/6+
/// - anything else: every output channel carries the average of all inputs
pub fn map_channels(
    input: &[f32],
    in_channels: usize,
    output: &mut [f32],
    out_channels: usize,
) -> usize {
    if in_channels == 0 || out_channels == 0 {
        return 0;
    }

    let frames = (input.len() / in_channels).min(output.len() / out_channels);
    let input = &input[..frames * in_channels];
    let output = &mut output[..frames * out_channels];

    if in_channels == 1 {
        for (sample, out_frame) in input.iter().zip(output.chunks_exact_mut(out_channels)) {
            out_frame.fill(*sample);
        }
    } else if in_channels == 2 && out_channels >= 2 {
        for (in_frame, out_frame) in input
            .chunks_exact(2)
            .zip(output.chunks_exact_mut(out_channels))
        {
            out_frame.fill(0.0);
            upmix_stereo_frame(in_frame[0], in_frame[1], out_frame);
        }
    } else {
        let scale = 1.0 / in_channels as f32;
        for (in_frame, out_frame) in input
            .chunks_exact(in_channels)
            .zip(output.chunks_exact_mut(out_channels))
        {
            let average = in_frame.iter().sum::<f32>() * scale;
            out_frame.fill(average);
        }
    }

    frames
}

fn upmix_stereo_frame(left: f32, right: f32, out_frame: &mut [f32]) {
    let channels = out_frame.len();
    out_frame[0] = left;
    out_frame[1] = right;

    if channels >= 6 {
        out_frame[2] = (left + right) * CENTER_GAIN;
        out_frame[3] = (left + right) * LFE_GAIN;
    }
    if channels >= 5 {
        out_frame[4] = left * REAR_GAIN;
    }
    if channels >= 6 {
        out_frame[5] = right * REAR_GAIN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn mono_duplicates_to_every_channel() {
        let input = [0.25, -0.5];
        let mut output = [0.0; 8];

        let frames = map_channels(&input, 1, &mut output, 4);

        assert_eq!(frames, 2);
        assert_eq!(output, [0.25, 0.25, 0.25, 0.25, -0.5, -0.5, -0.5, -0.5]);
    }

    #[test]
    fn stereo_passthrough() {
        let input = [0.1, 0.2, 0.3, 0.4];
        let mut output = [9.0; 4];

        assert_eq!(map_channels(&input, 2, &mut output, 2), 2);
        assert_eq!(output, input);
    }

    #[test]
    fn stereo_to_five_one() {
        let input = [0.4, 0.2];
        let mut output = [9.0; 6];

        map_channels(&input, 2, &mut output, 6);

        assert!(approx(output[0], 0.4));
        assert!(approx(output[1], 0.2));
        assert!(approx(output[2], 0.6 * 0.7));
        assert!(approx(output[3], 0.6 * 0.3));
        assert!(approx(output[4], 0.2));
        assert!(approx(output[5], 0.1));
    }

    #[test]
    fn stereo_to_quad_zeroes_rears() {
        let input = [0.4, 0.2];
        let mut output = [9.0; 4];

        map_channels(&input, 2, &mut output, 4);

        assert_eq!(output, [0.4, 0.2, 0.0, 0.0]);
    }

    #[test]
    fn stereo_to_seven_one_leaves_sides_silent() {
        let input = [0.4, 0.2];
        let mut output = [9.0; 8];

        map_channels(&input, 2, &mut output, 8);

        assert_eq!(output[6], 0.0);
        assert_eq!(output[7], 0.0);
    }

    #[test]
    fn stereo_to_mono_averages() {
        let input = [0.4, 0.2, -1.0, 1.0];
        let mut output = [9.0; 2];

        assert_eq!(map_channels(&input, 2, &mut output, 1), 2);
        assert!(approx(output[0], 0.3));
        assert!(approx(output[1], 0.0));
    }

    #[test]
    fn surround_downmix_averages_all_inputs() {
        let input = [0.6, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mut output = [9.0; 2];

        map_channels(&input, 6, &mut output, 2);

        assert!(approx(output[0], 0.1));
        assert!(approx(output[1], 0.1));
    }

    #[test]
    fn frame_count_limited_by_smaller_buffer() {
        let input = [0.5; 10];
        let mut output = [0.0; 4];

        assert_eq!(map_channels(&input, 1, &mut output, 2), 2);
    }

    #[test]
    fn zero_channels_maps_nothing() {
        let mut output = [0.0; 4];
        assert_eq!(map_channels(&[1.0], 0, &mut output, 2), 0);
        assert_eq!(map_channels(&[1.0], 1, &mut output, 0), 0);
    }
}
