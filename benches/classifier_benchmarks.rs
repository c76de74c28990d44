use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use k8s_ticket_report::classifier::{classify, is_managed_k8s};
use k8s_ticket_report::{Comment, CustomFieldEntry, Ticket, TicketStatus, DEPLOYMENT_FIELD_ID};

fn ticket(tags: &[&str]) -> Ticket {
    Ticket {
        id: 1,
        created_at: Utc::now(),
        status: TicketStatus::Closed,
        organization_id: Some(1),
        custom_fields: vec![
            CustomFieldEntry { id: 360_000_000_001, value: Some(vec!["priority_high".to_string()]) },
            CustomFieldEntry {
                id: DEPLOYMENT_FIELD_ID,
                value: Some(tags.iter().map(|t| t.to_string()).collect()),
            },
        ],
    }
}

fn custom_field_benchmark(c: &mut Criterion) {
    let tickets = vec![
        ticket(&["deploy_aws_eks"]),
        ticket(&["deploy_onprem", "deploy_azure_aks"]),
        ticket(&["deploy_onprem"]),
        ticket(&[]),
    ];

    c.bench_function("is_managed_k8s", |b| {
        b.iter(|| {
            for t in &tickets {
                black_box(is_managed_k8s(black_box(t)));
            }
        })
    });
}

fn comment_scan_benchmark(c: &mut Criterion) {
    let plain = ticket(&["deploy_onprem"]);
    let filler = "The broker restarted overnight and consumers lagged for about an hour. ".repeat(20);
    let mut comments: Vec<Comment> = (0..30).map(|_| Comment::new(filler.clone())).collect();
    comments.push(Comment::new("Output of KUBECTL get pods -A attached"));

    c.bench_function("classify_keyword_last_comment", |b| {
        b.iter(|| black_box(classify(black_box(&plain), black_box(&comments))))
    });
}

criterion_group!(benches, custom_field_benchmark, comment_scan_benchmark);
criterion_main!(benches);
