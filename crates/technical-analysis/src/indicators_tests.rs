#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use analysis_core::{AnalysisError, Bar, StochParams};
    use chrono::Utc;

    // Helper function to create sample bars (high, low, close)
    fn sample_bars() -> Vec<Bar> {
        let prices = vec![
            (102.0, 99.0, 101.0),
            (103.0, 100.0, 102.0),
            (104.0, 101.0, 103.0),
            (105.0, 102.0, 104.0),
            (106.0, 103.0, 105.0),
            (107.0, 104.0, 104.0),
            (108.0, 105.0, 106.0),
            (109.0, 106.0, 106.5),
            (110.0, 107.0, 109.0),
            (111.0, 108.0, 108.0),
            (112.0, 109.0, 111.0),
            (113.0, 110.0, 110.5),
            (114.0, 111.0, 113.0),
            (115.0, 112.0, 114.0),
            (116.0, 113.0, 115.0),
        ];

        prices
            .into_iter()
            .enumerate()
            .map(|(i, (high, low, close))| Bar {
                timestamp: Utc::now() - chrono::Duration::days(15 - i as i64),
                high,
                low,
                close,
            })
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!((result[2] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[3] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[4] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        let result = sma(&data, 5);

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_sma_propagates_nan() {
        let data = vec![1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0];
        let result = sma(&data, 2);

        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert!((result[3] - 3.5).abs() < 0.001);
    }

    #[test]
    fn test_fast_k_position_in_range() {
        let bars = sample_bars();
        let result = fast_k(&bars, 3);

        // Window of bars 0..=2: high 104, low 99, close 103
        assert!((result[2] - 80.0).abs() < 0.001);
        for &value in &result[2..] {
            assert!(value >= 0.0 && value <= 100.0);
        }
    }

    #[test]
    fn test_fast_k_flat_window_is_zero() {
        let mut bars = sample_bars();
        for bar in bars.iter_mut().skip(12) {
            bar.high = 120.0;
            bar.low = 120.0;
            bar.close = 120.0;
        }
        let result = fast_k(&bars, 3);

        assert_eq!(result[14], 0.0);
        // Window 11..=13 still has range: close 120 is the high
        assert!((result[13] - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_stochastic_basic() {
        let bars = sample_bars();
        let result = stochastic(&bars, StochParams::new(5, 3, 3)).unwrap();

        assert_eq!(result.k.len(), bars.len());
        assert_eq!(result.d.len(), bars.len());
        assert_eq!(result.first_valid, 8);
        assert_eq!(result.output_len(), 7);

        // Both lines are NaN during warm-up and populated afterwards
        for i in 0..result.first_valid {
            assert!(result.k[i].is_nan());
            assert!(result.d[i].is_nan());
        }
        for i in result.first_valid..bars.len() {
            assert!(result.k[i] >= 0.0 && result.k[i] <= 100.0);
            assert!(result.d[i] >= 0.0 && result.d[i] <= 100.0);
        }
    }

    #[test]
    fn test_stochastic_d_is_sma_of_k() {
        let bars = sample_bars();
        let result = stochastic(&bars, StochParams::new(5, 3, 3)).unwrap();

        let last = bars.len() - 1;
        let expected = (result.k[last] + result.k[last - 1] + result.k[last - 2]) / 3.0;
        assert!((result.d[last] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_stochastic_insufficient_data() {
        let bars = sample_bars()[..5].to_vec();
        let result = stochastic(&bars, StochParams::new(14, 3, 3)).unwrap();

        // Should handle insufficient data gracefully
        assert_eq!(result.output_len(), 0);
        assert!(result.k.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_stochastic_rejects_zero_period() {
        let bars = sample_bars();
        let result = stochastic(&bars, StochParams::new(5, 0, 3));
        assert!(matches!(result, Err(AnalysisError::Computation(_))));
    }
}
