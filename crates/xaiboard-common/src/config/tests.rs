#[cfg(test)]
mod tests {
    use super::super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(30));
        assert!(config.scoring.weights.is_none());
        assert!((config.scoring.tie_epsilon - 1e-9).abs() < 1e-15);
    }

    #[test]
    fn test_parse_toml() {
        let config = DashboardConfig::from_toml_str(r#"
            [backend]
            base_url = "http://xai.local/api"
            request_timeout_secs = 5

            [scoring]
            tie_epsilon = 1e-6

            [scoring.weights]
            MuFidelity = 2.0
            Sensitivity = 1.0

            [scoring.polarity]
            Sparsity = "lower_is_better"
        "#).unwrap();

        assert_eq!(config.backend.base_url, "http://xai.local/api");
        assert_eq!(config.backend.request_timeout_secs, 5);
        assert_eq!(config.server.host, "127.0.0.1");
        let weights = config.scoring.weights.clone().unwrap();
        assert_eq!(weights["MuFidelity"], 2.0);
        assert_eq!(config.scoring.catalog().polarity("Sparsity"), Polarity::LowerIsBetter);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let config = DashboardConfig::from_yaml_str("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = DashboardConfig::from_toml_str("[scoring.weights]\nComplexity = -1.0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = DashboardConfig::from_toml_str("[backend]\nrequest_timeout_secs = 0\n").unwrap();
        assert!(config.validate().is_err());
    }
}
