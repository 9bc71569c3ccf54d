//! End-to-end behavior of both engines
//!
//! These tests drive the engines the way the transport layer does: raw
//! rows in, contract responses or typed errors out.

mod knn_behavior {
    use crate::distance::DistanceMetric;
    use crate::error::PredictError;
    use crate::models::{Mode, Point, Prediction};
    use crate::points::{parse_rows, LabelKind, PointSet};
    use crate::predictor::knn;

    fn abc_training() -> PointSet {
        PointSet::build(&parse_rows("0,0,A;0,1,A;5,5,B"), LabelKind::Category).unwrap()
    }

    #[test]
    fn test_classifies_nearest_cluster() {
        let result = knn::predict(
            &abc_training(),
            &Point::new(vec![0.0, 0.5]),
            1,
            DistanceMetric::Euclidean,
            Mode::Classify,
        )
        .unwrap();
        assert_eq!(result.prediction, Prediction::Label("A".to_string()));
    }

    #[test]
    fn test_k_equal_to_training_size_is_valid() {
        let training = abc_training();
        let result = knn::predict(
            &training,
            &Point::new(vec![4.0, 4.0]),
            training.len(),
            DistanceMetric::Euclidean,
            Mode::Classify,
        );
        assert!(result.is_ok());
        assert_eq!(result.unwrap().neighbors.len(), 3);
    }

    #[test]
    fn test_k_beyond_training_size_is_not_clamped() {
        let training = abc_training();
        let err = knn::predict(
            &training,
            &Point::new(vec![4.0, 4.0]),
            training.len() + 1,
            DistanceMetric::Euclidean,
            Mode::Classify,
        )
        .unwrap_err();
        assert_eq!(err, PredictError::InsufficientData { k: 4, available: 3 });
    }

    #[test]
    fn test_regress_mode_averages_targets() {
        // Targets 0 and 10 at points equidistant from the query
        let training =
            PointSet::build(&parse_rows("0,0,0;0,10,10"), LabelKind::Target).unwrap();
        let result = knn::predict(
            &training,
            &Point::new(vec![0.0, 5.0]),
            2,
            DistanceMetric::Euclidean,
            Mode::Regress,
        )
        .unwrap();
        assert_eq!(result.prediction, Prediction::Value(5.0));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let training = PointSet::build(
            &parse_rows("1,1,A;2,2,B;1,1,C;3,0,A;0,3,B;2,2,C"),
            LabelKind::Category,
        )
        .unwrap();
        let query = Point::new(vec![1.5, 1.5]);

        for metric in [DistanceMetric::Euclidean, DistanceMetric::Manhattan] {
            let first = knn::predict(&training, &query, 4, metric, Mode::Classify).unwrap();
            for _ in 0..10 {
                let again = knn::predict(&training, &query, 4, metric, Mode::Classify).unwrap();
                assert_eq!(again, first);
            }
        }
    }
}

mod regression_behavior {
    use crate::error::PredictError;
    use crate::points::{parse_rows, LabelKind, PointSet};
    use crate::predictor::regression;

    fn pairs(text: &str) -> PointSet {
        PointSet::build(&parse_rows(text), LabelKind::Target).unwrap()
    }

    #[test]
    fn test_linear_points_recover_slope() {
        let result = regression::fit_predict(&pairs("0,0;1,2;2,4;3,6"), 1, 4.0).unwrap();
        let c = result.polynomial.coefficients();
        assert!(c[0].abs() < 1e-9, "intercept was {}", c[0]);
        assert!((c[1] - 2.0).abs() < 1e-9, "slope was {}", c[1]);
        assert!((result.prediction - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_points_is_underdetermined() {
        let err = regression::fit(&pairs("0,0;1,1"), 2).unwrap_err();
        assert_eq!(
            err,
            PredictError::UnderdeterminedSystem {
                degree: 2,
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_duplicate_x_is_singular() {
        let err = regression::fit(&pairs("1,0;1,5"), 1).unwrap_err();
        assert!(matches!(err, PredictError::SingularFit(_)));
    }
}

mod boundary_behavior {
    use crate::contract::PredictionRequest;
    use crate::models::Prediction;
    use crate::predictor::{KnnEngine, PredictionEngine, ResponseFormatter};

    #[test]
    fn test_non_latin_label_round_trip() {
        let request: PredictionRequest = serde_json::from_str(
            r#"{"mode": "classify", "points": [[0, 0, "貓咪"], [9, 9, "狗"]], "query": [1, 1], "k": 1}"#,
        )
        .unwrap();

        let outcome = KnnEngine::default().predict(&request);
        assert_eq!(
            outcome.as_ref().unwrap().prediction,
            Prediction::Label("貓咪".to_string())
        );

        let body = ResponseFormatter::new().format(&outcome).unwrap();
        assert!(body.contains(r#""prediction":"貓咪""#));
        assert!(!body.contains("\\u"));
    }
}
