//! Messages and client of the `submission.Submission` gRPC service.

tonic::include_proto!("submission");
