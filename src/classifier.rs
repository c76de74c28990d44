use crate::types::{Classification, Comment, Ticket, DEPLOYMENT_FIELD_ID};

/// Deployment tags that mark a managed Kubernetes install (Azure AKS, AWS EKS).
pub const MANAGED_K8S_TAGS: &[&str] = &["deploy_azure_aks", "deploy_aws_eks"];

pub const KEYWORD: &str = "kubectl";

/// True when the deployment custom field carries an AKS or EKS tag.
pub fn is_managed_k8s(ticket: &Ticket) -> bool {
    ticket
        .custom_fields
        .iter()
        .filter(|f| f.id == DEPLOYMENT_FIELD_ID)
        .filter_map(|f| f.value.as_ref())
        .flatten()
        .any(|tag| MANAGED_K8S_TAGS.iter().any(|m| tag.contains(*m)))
}

/// Case-insensitive keyword scan; stops at the first matching comment.
pub fn mentions_keyword<'a, I>(comments: I) -> bool
where
    I: IntoIterator<Item = &'a Comment>,
{
    comments
        .into_iter()
        .any(|c| c.body.to_lowercase().contains(KEYWORD))
}

/// Full classification of a ticket given all of its comments.
pub fn classify(ticket: &Ticket, comments: &[Comment]) -> Classification {
    if is_managed_k8s(ticket) {
        return Classification::ManagedK8s;
    }
    classify_comments(comments)
}

/// Second stage only, for callers that have already ruled out the custom field.
pub fn classify_comments(comments: &[Comment]) -> Classification {
    if mentions_keyword(comments) {
        Classification::KeywordK8s
    } else {
        Classification::NotK8s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomFieldEntry, TicketStatus};
    use chrono::Utc;

    fn ticket_with_fields(fields: Vec<CustomFieldEntry>) -> Ticket {
        Ticket {
            id: 1,
            created_at: Utc::now(),
            status: TicketStatus::Closed,
            organization_id: Some(10),
            custom_fields: fields,
        }
    }

    fn field(id: u64, tags: &[&str]) -> CustomFieldEntry {
        CustomFieldEntry {
            id,
            value: Some(tags.iter().map(|t| t.to_string()).collect()),
        }
    }

    fn comments(bodies: &[&str]) -> Vec<Comment> {
        bodies.iter().map(|b| Comment::new(*b)).collect()
    }

    #[test]
    fn test_managed_tags() {
        let eks = ticket_with_fields(vec![field(DEPLOYMENT_FIELD_ID, &["deploy_aws_eks"])]);
        let aks = ticket_with_fields(vec![field(DEPLOYMENT_FIELD_ID, &["other", "deploy_azure_aks"])]);
        assert!(is_managed_k8s(&eks));
        assert!(is_managed_k8s(&aks));

        // Tag matching is by substring
        let prefixed = ticket_with_fields(vec![field(DEPLOYMENT_FIELD_ID, &["x_deploy_aws_eks_v2"])]);
        assert!(is_managed_k8s(&prefixed));
    }

    #[test]
    fn test_managed_requires_deployment_field() {
        let wrong_field = ticket_with_fields(vec![field(99, &["deploy_aws_eks"])]);
        assert!(!is_managed_k8s(&wrong_field));

        let no_value = ticket_with_fields(vec![CustomFieldEntry { id: DEPLOYMENT_FIELD_ID, value: None }]);
        assert!(!is_managed_k8s(&no_value));

        let other_tags = ticket_with_fields(vec![field(DEPLOYMENT_FIELD_ID, &["deploy_onprem", "deploy_gke"])]);
        assert!(!is_managed_k8s(&other_tags));

        assert!(!is_managed_k8s(&ticket_with_fields(Vec::new())));
    }

    #[test]
    fn test_managed_ignores_comments() {
        let ticket = ticket_with_fields(vec![field(DEPLOYMENT_FIELD_ID, &["deploy_aws_eks"])]);
        assert_eq!(classify(&ticket, &comments(&["nothing here"])), Classification::ManagedK8s);
        assert_eq!(classify(&ticket, &comments(&["kubectl apply"])), Classification::ManagedK8s);
        assert_eq!(classify(&ticket, &[]), Classification::ManagedK8s);
    }

    #[test]
    fn test_keyword_scan() {
        let ticket = ticket_with_fields(Vec::new());
        assert_eq!(
            classify(&ticket, &comments(&["please help", "try running kubectl get pods"])),
            Classification::KeywordK8s
        );
        assert_eq!(classify(&ticket, &comments(&["Ran KUBECTL describe"])), Classification::KeywordK8s);
        assert_eq!(classify(&ticket, &comments(&["restart the broker"])), Classification::NotK8s);
        assert_eq!(classify(&ticket, &[]), Classification::NotK8s);
    }

    #[test]
    fn test_keyword_scan_stops_early() {
        let bodies = comments(&["kubectl logs", "kubectl get pods", "unrelated"]);
        let mut seen = 0;
        let hit = mentions_keyword(bodies.iter().inspect(|_| seen += 1));
        assert!(hit);
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_is_k8s() {
        assert!(Classification::ManagedK8s.is_k8s());
        assert!(Classification::KeywordK8s.is_k8s());
        assert!(!Classification::NotK8s.is_k8s());
    }
}
