//! AWS ARN rewrites

use std::sync::LazyLock;

use regex::Regex;

static EC2_INSTANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^arn:aws:ec2:.+/([^/]+)").unwrap());
static ECS_TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(arn:aws:ecs:[^:]+:\d+):task/([^/]+)/.*").unwrap());

/// Extract the instance id from an EC2 instance ARN.
/// Input that is not an EC2 ARN is returned unchanged.
pub fn ec2_instance_id_from_arn(arn: &str) -> String {
    EC2_INSTANCE_RE.replace(arn, "$1").into_owned()
}

/// Rewrite an ECS task ARN into the ARN of the cluster the task runs in.
/// Input that is not an ECS task ARN is returned unchanged.
pub fn ecs_task_arn_to_cluster_arn(arn: &str) -> String {
    ECS_TASK_RE.replace(arn, "${1}:cluster/${2}").into_owned()
}
