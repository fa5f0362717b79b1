//! Static check of the shell variables phases hand to each other.

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;

use crate::error::ContractError;
use crate::phase::Phase;

/// Every consumed variable must have exactly one producer, and that producer must
/// appear before the consumer in `order`.
pub fn verify_order(order: &[Phase]) -> Result<(), ContractError> {
    let mut producers: HashMap<&'static str, Phase> = HashMap::new();
    for &phase in order {
        for &var in phase.produces() {
            if let Some(&first) = producers.get(var) {
                return Err(ContractError::DuplicateProducer { var: var.to_string(), first, second: phase });
            }
            producers.insert(var, phase);
        }
    }

    let mut g: DiGraph<Phase, &'static str> = DiGraph::new();
    let ix: HashMap<Phase, _> = order.iter().map(|&p| (p, g.add_node(p))).collect();
    for &consumer in order {
        for &var in consumer.consumes() {
            let producer = *producers
                .get(var)
                .ok_or_else(|| ContractError::Unproduced { phase: consumer, var: var.to_string() })?;
            if producer != consumer {
                g.add_edge(ix[&producer], ix[&consumer], var);
            }
        }
    }
    toposort(&g, None).map_err(|_| ContractError::Cycle)?;

    let position: HashMap<Phase, usize> = order.iter().enumerate().map(|(i, &p)| (p, i)).collect();
    for edge in g.raw_edges() {
        let producer = g[edge.source()];
        let consumer = g[edge.target()];
        if position[&producer] > position[&consumer] {
            return Err(ContractError::OutOfOrder { var: edge.weight.to_string(), producer, consumer });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembly_order_satisfies_contract() {
        verify_order(&Phase::ASSEMBLY_ORDER).unwrap();
    }

    #[test]
    fn registry_order_breaks_contract() {
        // web_app reads APPINSIGHTS_KEY from app_service; moving it ahead must be caught.
        let mut order = Phase::ASSEMBLY_ORDER;
        order.swap(4, 6);
        assert!(matches!(
            verify_order(&order),
            Err(ContractError::OutOfOrder { producer: Phase::AppService, consumer: Phase::WebApp, .. })
        ));
    }

    #[test]
    fn missing_producer_is_reported() {
        let order: Vec<Phase> = Phase::ASSEMBLY_ORDER.into_iter().filter(|p| *p != Phase::EnvironmentVars).collect();
        assert!(matches!(
            verify_order(&order),
            Err(ContractError::Unproduced { phase: Phase::ResourceGroup, .. })
        ));
    }
}
